//! RDAP domain object parser.

use crate::types::DomainRecord;
use crate::utils::plain_date;
use serde_json::Value;

/// Build a [`DomainRecord`] from an RDAP domain object.
///
/// `rdap_host` is the host that answered; it is recorded as
/// `"<host> (RDAP)"` provenance.
pub fn parse_rdap(domain: &str, json: &Value, rdap_host: &str) -> DomainRecord {
    let mut record = DomainRecord::new(domain, DomainRecord::rdap_provenance(rdap_host));
    record.raw_data = json.to_string();

    // Extract dates from events
    if let Some(events) = json.get("events").and_then(|e| e.as_array()) {
        for event in events {
            if let (Some(action), Some(date)) = (
                event.get("eventAction").and_then(|a| a.as_str()),
                event.get("eventDate").and_then(|d| d.as_str()),
            ) {
                let slot = match action {
                    "registration" => &mut record.creation_date,
                    "expiration" => &mut record.expiration_date,
                    "last changed" => &mut record.updated_date,
                    _ => continue,
                };
                if slot.is_none() {
                    *slot = Some(plain_date(date));
                }
            }
        }
    }

    if let Some(statuses) = json.get("status").and_then(|s| s.as_array()) {
        record.status = statuses
            .iter()
            .filter_map(|s| s.as_str())
            .map(String::from)
            .collect();
    }

    if let Some(entities) = json.get("entities").and_then(|e| e.as_array()) {
        for entity in entities {
            if has_role(entity, "registrar") {
                if let Some(name) = vcard_text(entity, "fn") {
                    record.registrar = name;
                }
                record.registrar_url = vcard_text(entity, "url");
                record.abuse_email = nested_abuse_email(entity);
            } else if has_role(entity, "registrant") && record.owner.is_none() {
                record.owner = vcard_text(entity, "fn");
            } else if has_role(entity, "abuse") && record.abuse_email.is_none() {
                record.abuse_email = vcard_text(entity, "email");
            }
        }
    }

    if let Some(nameservers) = json.get("nameservers").and_then(|ns| ns.as_array()) {
        for nameserver in nameservers {
            if let Some(ldh_name) = nameserver.get("ldhName").and_then(|name| name.as_str()) {
                let host = ldh_name.trim().trim_end_matches('.').to_lowercase();
                if !host.is_empty() && !record.nameservers.contains(&host) {
                    record.nameservers.push(host);
                }
            }
        }
    }

    record
}

fn has_role(entity: &Value, role: &str) -> bool {
    entity
        .get("roles")
        .and_then(|r| r.as_array())
        .map(|roles| roles.iter().any(|r| r.as_str() == Some(role)))
        .unwrap_or(false)
}

/// Text value of a vCard property (`["fn", {}, "text", "Example Inc."]`).
fn vcard_text(entity: &Value, property: &str) -> Option<String> {
    entity
        .get("vcardArray")
        .and_then(|v| v.as_array())
        .and_then(|a| a.get(1))
        .and_then(|a| a.as_array())?
        .iter()
        .filter_map(|item| item.as_array())
        .filter(|item| item.len() >= 4)
        .find(|item| item.first().and_then(|f| f.as_str()) == Some(property))
        .and_then(|item| item.get(3))
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn nested_abuse_email(registrar: &Value) -> Option<String> {
    registrar
        .get("entities")
        .and_then(|e| e.as_array())?
        .iter()
        .filter(|entity| has_role(entity, "abuse"))
        .find_map(|entity| vcard_text(entity, "email"))
}
