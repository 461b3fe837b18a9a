//! Built-in message templates for the well-known event namespaces.
//!
//! Built-ins are channel-agnostic: the same subject and body are used for
//! email, chat, webhook and inbox delivery. They take priority over stored
//! overrides.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Subject and body source for one built-in event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltInTemplate {
    pub subject: &'static str,
    pub body: &'static str,
}

/// `(event_type, subject, body)` rows.
const CATALOG: &[(&str, &str, &str)] = &[
    (
        "vulnerability.assignment",
        "New vulnerability assigned to you",
        "A vulnerability task for project {{ payload.project }} has been assigned to you. \
         Priority: {{ event.severity }}.",
    ),
    (
        "code_finding.assignment",
        "New code finding assigned to you",
        "A code finding in project {{ payload.project }} has been assigned to you. \
         Priority: {{ event.severity }}.",
    ),
    (
        "project.scan.completed",
        "Project scan completed",
        "Scan finished for {{ payload.project }}. Findings: {{ payload.vulns }} vulns, \
         {{ payload.code_findings }} code findings.",
    ),
    (
        "project.scan.failed",
        "Project scan failed",
        "Scan failed for {{ payload.project }}. Error: {{ payload.error }}",
    ),
    (
        "sbom.scan.completed",
        "SBOM scan completed",
        "Manual SBOM scan finished for {{ payload.project }}. Findings: {{ payload.vulns }} vulns, \
         {{ payload.code_findings }} code findings.",
    ),
    (
        "sbom.scan.failed",
        "SBOM scan failed",
        "Manual SBOM scan failed for {{ payload.project }}. Error: {{ payload.error }}",
    ),
    (
        "project.scan.summary",
        "Project scan summary",
        "{{ payload.project }} scan complete: {{ payload.vulns }} vulns, \
         {{ payload.code_findings }} code findings.",
    ),
    (
        "sbom.scan.summary",
        "SBOM scan summary",
        "SBOM uploaded for {{ payload.project }}: {{ payload.components }} components, \
         {{ payload.vulns }} vulns found.",
    ),
    (
        "payment.success",
        "Payment received",
        "Your payment for {{ payload.plan_name }} succeeded. Amount: {{ payload.amount }}. Thank you!",
    ),
    (
        "payment.failed",
        "Payment failed",
        "A payment attempt for {{ payload.plan_name }} failed. Please update billing details.",
    ),
];

static BUILT_INS: LazyLock<HashMap<&'static str, BuiltInTemplate>> = LazyLock::new(|| {
    CATALOG
        .iter()
        .map(|&(event_type, subject, body)| (event_type, BuiltInTemplate { subject, body }))
        .collect()
});

/// Exact-match lookup of a built-in template.
pub fn built_in(event_type: &str) -> Option<BuiltInTemplate> {
    BUILT_INS.get(event_type).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_namespaces_have_built_ins() {
        for event_type in [
            "vulnerability.assignment",
            "code_finding.assignment",
            "project.scan.completed",
            "project.scan.failed",
            "project.scan.summary",
            "sbom.scan.completed",
            "sbom.scan.failed",
            "sbom.scan.summary",
            "payment.success",
            "payment.failed",
        ] {
            assert!(built_in(event_type).is_some(), "{event_type}");
        }
    }

    #[test]
    fn lookup_is_exact() {
        assert!(built_in("payment").is_none());
        assert!(built_in("payment.success.extra").is_none());
        assert!(built_in("PAYMENT.SUCCESS").is_none());
    }

    #[test]
    fn catalog_has_no_duplicate_keys() {
        assert_eq!(CATALOG.len(), BUILT_INS.len());
    }
}
