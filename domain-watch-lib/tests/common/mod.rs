//! In-test doubles for the HTTP and WHOIS transports.

#![allow(dead_code)]

use async_trait::async_trait;
use domain_watch_lib::protocols::{HttpFetch, HttpReply, RequestProfile, WhoisQuery};
use domain_watch_lib::DomainWatchError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned replies by URL; unknown URLs get a plain-text 404.
#[derive(Default)]
pub struct FakeHttp {
    replies: Mutex<HashMap<String, HttpReply>>,
    calls: Mutex<Vec<(String, RequestProfile)>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, url: &str, reply: HttpReply) {
        self.replies.lock().unwrap().insert(url.to_string(), reply);
    }

    pub fn json(&self, url: &str, body: serde_json::Value) {
        self.set(url, HttpReply::new(200, body.to_string()).with_content_type("application/json"));
    }

    pub fn text(&self, url: &str, body: &str) {
        self.set(url, HttpReply::new(200, body).with_content_type("text/plain"));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }

    pub fn profiles(&self) -> Vec<(String, RequestProfile)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpFetch for FakeHttp {
    async fn get(&self, url: &str, profile: RequestProfile) -> Result<HttpReply, DomainWatchError> {
        self.calls.lock().unwrap().push((url.to_string(), profile));
        Ok(self
            .replies
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| HttpReply::new(404, "Not Found").with_content_type("text/plain")))
    }
}

/// Serves canned WHOIS replies by `(server, query)`; anything else is a
/// connection failure.
#[derive(Default)]
pub struct FakeWhois {
    replies: Mutex<HashMap<(String, String), String>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeWhois {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, server: &str, query: &str, reply: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert((server.to_string(), query.to_string()), reply.to_string());
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WhoisQuery for FakeWhois {
    async fn query(&self, server: &str, query: &str) -> Result<String, DomainWatchError> {
        self.calls
            .lock()
            .unwrap()
            .push((server.to_string(), query.to_string()));
        self.replies
            .lock()
            .unwrap()
            .get(&(server.to_string(), query.to_string()))
            .cloned()
            .ok_or_else(|| DomainWatchError::whois(server, "Connection refused"))
    }
}

pub const TLD_LIST: &str = "# Version 2024013100, Last Updated Wed Jan 31 07:07:01 2024 UTC
COM
NET
UK
";

pub fn bootstrap() -> serde_json::Value {
    serde_json::json!({
        "description": "RDAP bootstrap file for Domain Name System registrations",
        "publication": "2024-01-30T22:00:01Z",
        "services": [
            [["com", "net"], ["https://rdap.verisign.test/com/v1/"]]
        ],
        "version": "1.0"
    })
}

pub fn rdap_domain(name: &str) -> serde_json::Value {
    serde_json::json!({
        "objectClassName": "domain",
        "ldhName": name.to_uppercase(),
        "status": ["client transfer prohibited"],
        "events": [
            {"eventAction": "registration", "eventDate": "1995-08-14T04:00:00Z"},
            {"eventAction": "expiration", "eventDate": "2030-08-13T04:00:00Z"},
            {"eventAction": "last changed", "eventDate": "2024-08-14T07:01:34Z"}
        ],
        "entities": [{
            "objectClassName": "entity",
            "roles": ["registrar"],
            "vcardArray": ["vcard", [
                ["version", {}, "text", "4.0"],
                ["fn", {}, "text", "Example Registrar, Inc."]
            ]]
        }],
        "nameservers": [
            {"objectClassName": "nameserver", "ldhName": "A.IANA-SERVERS.NET."},
            {"objectClassName": "nameserver", "ldhName": "B.IANA-SERVERS.NET"}
        ]
    })
}
