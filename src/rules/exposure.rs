use serde_json::{Map, Value};

use crate::core::{Action, Finding, ResourceChange, Severity};

use super::classify::{
    LOAD_BALANCER_TYPES, PROVIDER_PREFIX, PUBLIC_CIDRS, PUBLIC_COMMON_PORTS, PUBLIC_IP_FLAGS,
    SECURITY_GROUP_RULE_TYPES, SECURITY_GROUP_TYPE,
};
use super::{as_bool, as_int, as_str, filter_paths, new_finding};

pub const PUBLIC_INGRESS_TITLE: &str = "Public ingress exposure detected";
pub const INTERNET_FACING_LB_TITLE: &str = "Internet-facing load balancer detected";
pub const PUBLIC_IP_TITLE: &str = "Public IP association enabled";

const INGRESS_PATH_HINTS: &[&str] = &["ingress", "cidr", "port", "protocol", "security_group"];
const LB_PATH_HINTS: &[&str] = &["scheme", "internal"];
const PUBLIC_IP_PATH_HINTS: &[&str] = &[
    "public_ip",
    "associate_public_ip_address",
    "map_public_ip_on_launch",
];

fn applies(action: Action) -> bool {
    matches!(action, Action::Create | Action::Update | Action::Replace)
}

pub(super) fn public_ingress(ch: &ResourceChange) -> Vec<Finding> {
    if !applies(ch.action) {
        return Vec::new();
    }

    let mut matches: Vec<String> = extract_ingress_rules(&ch.resource_type, &ch.after)
        .into_iter()
        .filter(IngressRule::is_exposed)
        .map(|rule| rule.describe())
        .collect();
    if matches.is_empty() {
        return Vec::new();
    }
    matches.sort();

    vec![new_finding(
        Severity::High,
        PUBLIC_INGRESS_TITLE,
        format!(
            "Resource {} allows ingress from public CIDR ranges on commonly targeted ports.",
            ch.address
        ),
        ch,
        filter_paths(&ch.change_paths, INGRESS_PATH_HINTS),
        matches,
    )]
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct IngressRule {
    from_port: i64,
    to_port: i64,
    all_protocols: bool,
    cidrs: Vec<String>,
}

impl IngressRule {
    fn from_map(m: &Map<String, Value>) -> Self {
        let from_port = m.get("from_port").and_then(as_int).unwrap_or(0);
        let to_port = m.get("to_port").and_then(as_int).unwrap_or(from_port);
        let protocol = m.get("protocol").and_then(as_str).unwrap_or("");
        Self {
            from_port,
            to_port,
            all_protocols: protocol == "-1" || protocol.eq_ignore_ascii_case("all"),
            cidrs: collect_cidrs(m),
        }
    }

    fn has_public_cidr(&self) -> bool {
        self.cidrs.iter().any(|c| PUBLIC_CIDRS.contains(&c.as_str()))
    }

    fn overlaps_common_port(&self) -> bool {
        let low = self.from_port.min(self.to_port);
        let high = self.from_port.max(self.to_port);
        PUBLIC_COMMON_PORTS.iter().any(|p| (low..=high).contains(p))
    }

    fn is_exposed(&self) -> bool {
        self.has_public_cidr() && (self.all_protocols || self.overlaps_common_port())
    }

    fn describe(&self) -> String {
        format!(
            "{} ports={}-{}",
            self.cidrs.join(","),
            self.from_port,
            self.to_port
        )
    }
}

fn extract_ingress_rules(resource_type: &str, after: &Value) -> Vec<IngressRule> {
    let Some(m) = after.as_object() else {
        return Vec::new();
    };

    if resource_type == SECURITY_GROUP_TYPE {
        let Some(list) = m.get("ingress").and_then(Value::as_array) else {
            return Vec::new();
        };
        return list
            .iter()
            .filter_map(Value::as_object)
            .map(IngressRule::from_map)
            .collect();
    }

    if SECURITY_GROUP_RULE_TYPES.contains(&resource_type) {
        let direction = m.get("type").and_then(as_str).unwrap_or("");
        if !direction.is_empty() && direction != "ingress" {
            return Vec::new();
        }
        return vec![IngressRule::from_map(m)];
    }

    Vec::new()
}

fn collect_cidrs(m: &Map<String, Value>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for key in ["cidr_blocks", "ipv6_cidr_blocks"] {
        if let Some(list) = m.get(key).and_then(Value::as_array) {
            out.extend(list.iter().filter_map(as_str).map(str::to_string));
        }
    }
    for key in ["cidr_ipv4", "cidr_ipv6"] {
        if let Some(s) = m.get(key).and_then(as_str).filter(|s| !s.is_empty()) {
            out.push(s.to_string());
        }
    }
    out.sort();
    out
}

pub(super) fn internet_facing_lb(ch: &ResourceChange) -> Vec<Finding> {
    if !applies(ch.action) || !LOAD_BALANCER_TYPES.contains(&ch.resource_type.as_str()) {
        return Vec::new();
    }
    let Some(after) = ch.after.as_object() else {
        return Vec::new();
    };

    let trigger = if after.get("scheme").and_then(as_str) == Some("internet-facing") {
        "scheme=internet-facing"
    } else if after.get("internal").and_then(as_bool) == Some(false) {
        "internal=false"
    } else {
        return Vec::new();
    };

    vec![new_finding(
        Severity::High,
        INTERNET_FACING_LB_TITLE,
        format!("Load balancer {} is configured as internet-facing.", ch.address),
        ch,
        filter_paths(&ch.change_paths, LB_PATH_HINTS),
        vec![trigger.to_string()],
    )]
}

pub(super) fn public_ip_association(ch: &ResourceChange) -> Vec<Finding> {
    if !applies(ch.action) || !ch.resource_type.starts_with(PROVIDER_PREFIX) {
        return Vec::new();
    }
    let Some(flag) = PUBLIC_IP_FLAGS
        .iter()
        .copied()
        .find(|flag| has_true_field(&ch.after, flag))
    else {
        return Vec::new();
    };

    vec![new_finding(
        Severity::High,
        PUBLIC_IP_TITLE,
        format!("Resource {} enables public IP association.", ch.address),
        ch,
        filter_paths(&ch.change_paths, PUBLIC_IP_PATH_HINTS),
        vec![format!("{flag}=true")],
    )]
}

/// Searches the whole tree, at any depth, for `field` set to true.
fn has_true_field(v: &Value, field: &str) -> bool {
    match v {
        Value::Object(m) => m.iter().any(|(k, val)| {
            (k == field && as_bool(val) == Some(true)) || has_true_field(val, field)
        }),
        Value::Array(items) => items.iter().any(|item| has_true_field(item, field)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::tests::change;
    use serde_json::json;

    fn sg(action: Action, after: Value) -> ResourceChange {
        let mut ch = change("aws_security_group.web", "aws_security_group", action);
        ch.after = after;
        ch
    }

    #[test]
    fn ssh_open_to_the_world_is_flagged_with_evidence() {
        let mut ch = sg(
            Action::Update,
            json!({"ingress": [{"from_port": 22, "to_port": 22, "protocol": "tcp", "cidr_blocks": ["0.0.0.0/0"]}]}),
        );
        ch.change_paths = vec![
            "ingress[0].cidr_blocks[0]".to_string(),
            "ingress[0].from_port".to_string(),
            "name".to_string(),
        ];
        let findings = public_ingress(&ch);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[0].title, PUBLIC_INGRESS_TITLE);
        assert_eq!(findings[0].evidence.matches, vec!["0.0.0.0/0 ports=22-22"]);
        assert_eq!(
            findings[0].evidence.change_paths,
            vec!["ingress[0].cidr_blocks[0]", "ingress[0].from_port"]
        );
    }

    #[test]
    fn private_cidr_is_not_flagged() {
        let ch = sg(
            Action::Update,
            json!({"ingress": [{"from_port": 22, "to_port": 22, "protocol": "tcp", "cidr_blocks": ["10.0.0.0/8"]}]}),
        );
        assert!(public_ingress(&ch).is_empty());
    }

    #[test]
    fn uncommon_port_is_not_flagged_unless_all_protocols() {
        let tcp = sg(
            Action::Create,
            json!({"ingress": [{"from_port": 8080, "to_port": 8081, "protocol": "tcp", "cidr_blocks": ["0.0.0.0/0"]}]}),
        );
        assert!(public_ingress(&tcp).is_empty());

        for protocol in ["-1", "all", "ALL"] {
            let all = sg(
                Action::Create,
                json!({"ingress": [{"from_port": 8080, "to_port": 8081, "protocol": protocol, "cidr_blocks": ["0.0.0.0/0"]}]}),
            );
            assert_eq!(public_ingress(&all).len(), 1, "{protocol}");
        }
    }

    #[test]
    fn reversed_port_range_is_normalized() {
        let ch = sg(
            Action::Create,
            json!({"ingress": [{"from_port": 500, "to_port": 400, "protocol": "tcp", "cidr_blocks": ["0.0.0.0/0"]}]}),
        );
        let findings = public_ingress(&ch);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].evidence.matches, vec!["0.0.0.0/0 ports=500-400"]);
    }

    #[test]
    fn port_defaults() {
        let only_from = IngressRule::from_map(json!({"from_port": 443}).as_object().expect("map"));
        assert_eq!((only_from.from_port, only_from.to_port), (443, 443));
        let none = IngressRule::from_map(json!({}).as_object().expect("map"));
        assert_eq!((none.from_port, none.to_port), (0, 0));
        assert!(!none.overlaps_common_port());
    }

    #[test]
    fn ipv6_world_cidr_counts_and_cidrs_are_sorted() {
        let ch = sg(
            Action::Update,
            json!({"ingress": [{
                "from_port": "3389", "to_port": "3389", "protocol": "tcp",
                "cidr_blocks": ["10.0.0.0/8"], "ipv6_cidr_blocks": ["::/0"]
            }]}),
        );
        let findings = public_ingress(&ch);
        assert_eq!(findings[0].evidence.matches, vec!["10.0.0.0/8,::/0 ports=3389-3389"]);
    }

    #[test]
    fn multiple_rules_yield_one_finding_with_sorted_matches() {
        let ch = sg(
            Action::Update,
            json!({"ingress": [
                {"from_port": 443, "to_port": 443, "protocol": "tcp", "cidr_blocks": ["0.0.0.0/0"]},
                {"from_port": 22, "to_port": 22, "protocol": "tcp", "cidr_blocks": ["0.0.0.0/0"]},
                {"from_port": 5432, "to_port": 5432, "protocol": "tcp", "cidr_blocks": ["10.1.0.0/16"]},
                "not-a-rule"
            ]}),
        );
        let findings = public_ingress(&ch);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].evidence.matches,
            vec!["0.0.0.0/0 ports=22-22", "0.0.0.0/0 ports=443-443"]
        );
    }

    #[test]
    fn single_rule_resources_respect_direction() {
        let mut ingress = change(
            "aws_security_group_rule.ssh",
            "aws_security_group_rule",
            Action::Create,
        );
        ingress.after = json!({"type": "ingress", "from_port": 22, "to_port": 22, "protocol": "tcp", "cidr_blocks": ["0.0.0.0/0"]});
        assert_eq!(public_ingress(&ingress).len(), 1);

        let mut egress = ingress.clone();
        egress.after["type"] = json!("egress");
        assert!(public_ingress(&egress).is_empty());

        let mut vpc_rule = change(
            "aws_vpc_security_group_ingress_rule.pg",
            "aws_vpc_security_group_ingress_rule",
            Action::Create,
        );
        vpc_rule.after = json!({"from_port": 5432, "to_port": 5432, "ip_protocol": "tcp", "cidr_ipv4": "0.0.0.0/0"});
        let findings = public_ingress(&vpc_rule);
        assert_eq!(findings[0].evidence.matches, vec!["0.0.0.0/0 ports=5432-5432"]);
    }

    #[test]
    fn ingress_ignores_delete_other_types_and_bad_shapes() {
        let open = json!({"ingress": [{"from_port": 22, "to_port": 22, "protocol": "tcp", "cidr_blocks": ["0.0.0.0/0"]}]});
        assert!(public_ingress(&sg(Action::Delete, open.clone())).is_empty());

        let mut other = change("aws_instance.web", "aws_instance", Action::Update);
        other.after = open;
        assert!(public_ingress(&other).is_empty());

        assert!(public_ingress(&sg(Action::Update, json!(null))).is_empty());
        assert!(public_ingress(&sg(Action::Update, json!({"ingress": "0.0.0.0/0"}))).is_empty());
        assert!(public_ingress(&sg(Action::Update, json!([1, 2]))).is_empty());
    }

    #[test]
    fn internet_facing_scheme_is_flagged() {
        let mut ch = change("aws_lb.public", "aws_lb", Action::Create);
        ch.after = json!({"scheme": "internet-facing"});
        let findings = internet_facing_lb(&ch);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, INTERNET_FACING_LB_TITLE);
        assert_eq!(findings[0].evidence.matches, vec!["scheme=internet-facing"]);
    }

    #[test]
    fn internal_false_is_flagged_but_absent_is_not() {
        let mut ch = change("aws_alb.front", "aws_alb", Action::Update);
        ch.after = json!({"internal": false});
        assert_eq!(internet_facing_lb(&ch)[0].evidence.matches, vec!["internal=false"]);

        ch.after = json!({"internal": true});
        assert!(internet_facing_lb(&ch).is_empty());

        ch.after = json!({"name": "front"});
        assert!(internet_facing_lb(&ch).is_empty());
    }

    #[test]
    fn lb_rule_skips_other_types() {
        let mut ch = change("aws_lb_listener.l", "aws_lb_listener", Action::Create);
        ch.after = json!({"scheme": "internet-facing"});
        assert!(internet_facing_lb(&ch).is_empty());
    }

    #[test]
    fn public_ip_flag_found_at_any_depth() {
        let mut ch = change("aws_launch_template.app", "aws_launch_template", Action::Create);
        ch.after = json!({
            "network_interfaces": [
                {"device_index": 0, "settings": {"associate_public_ip_address": true}}
            ]
        });
        let findings = public_ip_association(&ch);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].title, PUBLIC_IP_TITLE);
        assert_eq!(
            findings[0].evidence.matches,
            vec!["associate_public_ip_address=true"]
        );
    }

    #[test]
    fn public_ip_flag_false_or_foreign_provider_is_ignored() {
        let mut ch = change("aws_subnet.a", "aws_subnet", Action::Update);
        ch.after = json!({"map_public_ip_on_launch": false});
        assert!(public_ip_association(&ch).is_empty());

        ch.after = json!({"map_public_ip_on_launch": "true"});
        assert_eq!(public_ip_association(&ch).len(), 1);

        let mut gcp = change("google_compute_instance.a", "google_compute_instance", Action::Create);
        gcp.after = json!({"associate_public_ip_address": true});
        assert!(public_ip_association(&gcp).is_empty());
    }
}
