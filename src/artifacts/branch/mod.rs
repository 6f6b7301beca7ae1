pub mod branch;
pub mod branch_name;

/// Ref-name rules borrowed from git: no leading dot or slash, no `..`, no
/// `.lock` suffix, no `@{`, no whitespace, control or glob characters
pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";
