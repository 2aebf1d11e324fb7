// Resource-type tables for the AWS provider family.

const STATEFUL_TYPES: &[&str] = &[
    "aws_db_instance",
    "aws_rds_cluster",
    "aws_rds_cluster_instance",
    "aws_s3_bucket",
    "aws_eks_cluster",
];

const STATEFUL_PREFIXES: &[&str] = &["aws_elasticache_", "aws_efs_"];

pub(crate) const IAM_PREFIX: &str = "aws_iam_";

const IAM_ATTACHMENT_TYPES: &[&str] = &[
    "aws_iam_group_policy_attachment",
    "aws_iam_policy_attachment",
    "aws_iam_role_policy_attachment",
    "aws_iam_user_policy_attachment",
];

const IAM_POLICY_DOC_TYPES: &[&str] = &[
    "aws_iam_group_policy",
    "aws_iam_policy",
    "aws_iam_role_policy",
    "aws_iam_user_policy",
];

const NETWORK_ROUTING_TYPES: &[&str] = &[
    "aws_internet_gateway",
    "aws_nat_gateway",
    "aws_route",
    "aws_route_table",
    "aws_route_table_association",
    "aws_vpn_gateway",
];

const NETWORK_ROUTING_PREFIXES: &[&str] = &["aws_ec2_transit_gateway"];

pub(crate) const SECURITY_GROUP_TYPE: &str = "aws_security_group";

pub(crate) const SECURITY_GROUP_RULE_TYPES: &[&str] =
    &["aws_security_group_rule", "aws_vpc_security_group_ingress_rule"];

pub(crate) const LOAD_BALANCER_TYPES: &[&str] = &["aws_lb", "aws_alb", "aws_elb"];

pub(crate) const PROVIDER_PREFIX: &str = "aws_";

pub(crate) const PUBLIC_IP_FLAGS: &[&str] = &[
    "associate_public_ip_address",
    "map_public_ip_on_launch",
    "associate_carrier_ip_address",
];

pub(crate) const PUBLIC_COMMON_PORTS: &[i64] = &[22, 80, 443, 3389, 3306, 5432, 6379];

pub(crate) const PUBLIC_CIDRS: &[&str] = &["0.0.0.0/0", "::/0"];

pub(crate) const STATEFUL_IMPACTFUL_PATH_HINTS: &[&str] = &[
    "allocated_storage",
    "storage_type",
    "engine_version",
    "instance_class",
    "storage_encrypted",
    "kms_key_id",
    "encrypted",
    "snapshot_retention_limit",
];

pub(crate) const TAG_FIELDS: &[&str] = &["tags", "tags_all"];

pub(crate) const IAM_POLICY_PATH_HINTS: &[&str] = &["policy", "assume_role_policy", "inline_policy"];

fn matches_table(resource_type: &str, exact: &[&str], prefixes: &[&str]) -> bool {
    exact.contains(&resource_type) || prefixes.iter().any(|p| resource_type.starts_with(p))
}

pub fn is_stateful(resource_type: &str) -> bool {
    matches_table(resource_type, STATEFUL_TYPES, STATEFUL_PREFIXES)
}

pub fn is_network_routing(resource_type: &str) -> bool {
    matches_table(resource_type, NETWORK_ROUTING_TYPES, NETWORK_ROUTING_PREFIXES)
}

pub fn is_iam(resource_type: &str) -> bool {
    resource_type.starts_with(IAM_PREFIX)
}

pub fn is_iam_attachment(resource_type: &str) -> bool {
    IAM_ATTACHMENT_TYPES.contains(&resource_type)
}

pub fn is_iam_policy_document(resource_type: &str) -> bool {
    IAM_POLICY_DOC_TYPES.contains(&resource_type)
}
