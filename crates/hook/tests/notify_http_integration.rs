use std::net::TcpListener;

use hgnotify_hook::hg::{BranchLookup, HgError};
use hgnotify_hook::hook::CommitEvent;
use hgnotify_hook::notifier::{CommitNotifier, NotifyError};
use httpmock::prelude::*;

const REPO_URL: &str = "http://hg.example.com/repo";
const EXPECTED_BODY: &str =
    "url=http%3A%2F%2Fhg.example.com%2Frepo&branch=default&changesetId=abc123";

struct StaticRepo(&'static str);

impl BranchLookup for StaticRepo {
    fn branch(&self, _node: &str) -> Result<String, HgError> {
        Ok(self.0.to_string())
    }
}

fn event() -> CommitEvent {
    CommitEvent::from_vars([
        ("HG_NODE", "abc123"),
        ("HG_PARENT1", "0000000000000000000000000000000000000000"),
        ("HG_HOOKNAME", "commit.hgnotify"),
    ])
    .expect("event should parse")
}

#[test]
fn commit_sends_exactly_one_form_post() {
    let server = MockServer::start();
    let notify = server.mock(|when, then| {
        when.method(POST)
            .path("/mercurial/notifyCommit")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(EXPECTED_BODY);
        then.status(200).body("Scheduled polling of project\n");
    });

    let notifier = CommitNotifier::new(&server.url("/"), REPO_URL).expect("notifier should build");
    notifier.notify(&StaticRepo("default"), &event()).expect("notify should succeed");

    notify.assert_hits(1);
}

#[test]
fn base_url_context_path_is_kept() {
    let server = MockServer::start();
    let notify = server.mock(|when, then| {
        when.method(POST).path("/jenkins/mercurial/notifyCommit");
        then.status(200);
    });

    let notifier =
        CommitNotifier::new(&server.url("/jenkins/"), REPO_URL).expect("notifier should build");
    notifier.notify(&StaticRepo("default"), &event()).expect("notify should succeed");

    notify.assert_hits(1);
}

#[test]
fn malformed_response_body_is_ignored() {
    let server = MockServer::start();
    let notify = server.mock(|when, then| {
        when.method(POST).path("/mercurial/notifyCommit");
        then.status(200).body([0xff, 0xfe, 0x00, 0xc3, 0x28, 0xa0, 0xa1]);
    });

    let notifier = CommitNotifier::new(&server.url("/"), REPO_URL).expect("notifier should build");
    notifier
        .notify(&StaticRepo("default"), &event())
        .expect("undecodable body must not raise a secondary error");

    notify.assert_hits(1);
}

#[test]
fn server_error_status_propagates() {
    let server = MockServer::start();
    let notify = server.mock(|when, then| {
        when.method(POST).path("/mercurial/notifyCommit");
        then.status(500).body("boom");
    });

    let notifier = CommitNotifier::new(&server.url("/"), REPO_URL).expect("notifier should build");
    let error = notifier.notify(&StaticRepo("default"), &event()).expect_err("500 should fail");

    match error {
        NotifyError::Http(source) => {
            assert_eq!(source.status().map(|status| status.as_u16()), Some(500));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    notify.assert_hits(1);
}

#[test]
fn connection_refused_propagates() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let notifier = CommitNotifier::new(&format!("http://127.0.0.1:{port}/"), REPO_URL)
        .expect("notifier should build");
    let error = notifier
        .notify(&StaticRepo("default"), &event())
        .expect_err("closed port should fail");

    match error {
        NotifyError::Http(source) => assert!(source.is_connect(), "{source:?}"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn invalid_payload_never_reaches_server() {
    let server = MockServer::start();
    let notify = server.mock(|when, then| {
        when.method(POST);
        then.status(200);
    });

    let notifier = CommitNotifier::new(&server.url("/"), "  ").expect("notifier should build");
    let error = notifier.notify(&StaticRepo("default"), &event()).expect_err("blank url");

    assert!(matches!(error, NotifyError::Payload(_)));
    notify.assert_hits(0);
}
