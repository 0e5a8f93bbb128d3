//! Rule service paths, relative to the API base URL

pub const RULES: &str = "/rules";
pub const RULE_SEARCH: &str = "/rules/search";
pub const RULE_STATISTICS: &str = "/rules/statistics";
pub const RULE_EXPORT: &str = "/rules/export";
pub const RULE_IMPORT: &str = "/rules/import";
pub const RULE_TEST: &str = "/rules/test";
pub const RULE_VALIDATE: &str = "/rules/test/validate";

pub fn rule(id: u64) -> String {
    format!("{}/{}", RULES, id)
}

pub fn rule_status(id: u64) -> String {
    format!("{}/{}/status", RULES, id)
}
