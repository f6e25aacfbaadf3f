//! Request parser vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use bytes::Bytes;

use localserver_core::http::Request;

mod vector_loader;
use vector_loader::TestVector;

fn load(name: &str) -> TestVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

#[test]
fn request_vectors() {
    let files = [
        "get_simple.json",
        "get_query_cookies.json",
        "post_body_lf.json",
        "put_binary_body.json",
        "bad_request_line.json",
        "bad_protocol.json",
    ];

    for f in files {
        let v = load(f);
        let res = Request::parse(Bytes::from(v.request.decode()));

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.status().as_u16(), err.status, "vector={}", v.description);
            continue;
        }

        let req = res.expect("expected ok request");
        let ex = v.expect.expect("missing expect block");

        let head = req.head();
        assert_eq!(req.method(), ex["method"].as_str().unwrap(), "vector={}", v.description);
        if let Some(version) = ex.get("version").and_then(|s| s.as_str()) {
            assert_eq!(head.version(), version, "vector={}", v.description);
        }
        assert_eq!(req.path(), ex["path"].as_str().unwrap(), "vector={}", v.description);
        assert_eq!(
            req.query_string(),
            ex["query"].as_str(),
            "vector={}",
            v.description
        );
        let body_len = ex["body_len"].as_u64().unwrap();
        assert_eq!(req.body().len() as u64, body_len, "vector={}", v.description);

        if let Some(headers) = ex.get("headers").and_then(|h| h.as_object()) {
            for (name, value) in headers {
                let got = req.header(name);
                assert_eq!(got, value.as_str(), "vector={} header={name}", v.description);
            }
        }
        if let Some(cookies) = ex.get("cookies").and_then(|h| h.as_object()) {
            for (name, value) in cookies {
                let got = req.cookie(name);
                assert_eq!(got, value.as_str(), "vector={} cookie={name}", v.description);
            }
        }
        match ex.get("params").and_then(|h| h.as_object()) {
            Some(params) => {
                assert_eq!(head.query_params().len(), params.len(), "vector={}", v.description);
                for (name, value) in params {
                    let got = head.query_param(name);
                    assert_eq!(got, value.as_str(), "vector={} param={name}", v.description);
                }
            }
            None => assert!(head.query_params().is_empty(), "vector={}", v.description),
        }
    }
}
