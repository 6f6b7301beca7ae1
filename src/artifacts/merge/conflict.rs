const OURS_MARKER: &str = "<<<<<<< HEAD\n";
const SEPARATOR: &str = "=======\n";
const THEIRS_MARKER: &str = ">>>>>>>\n";

/// Content written to a conflicted path
///
/// A side that deleted the file contributes nothing between its markers. A
/// side without a trailing newline gets one so the markers stay on their own
/// lines.
pub fn render_conflict(ours: Option<&str>, theirs: Option<&str>) -> String {
    let mut rendered = String::from(OURS_MARKER);
    push_side(&mut rendered, ours);
    rendered.push_str(SEPARATOR);
    push_side(&mut rendered, theirs);
    rendered.push_str(THEIRS_MARKER);

    rendered
}

fn push_side(rendered: &mut String, side: Option<&str>) {
    if let Some(content) = side {
        rendered.push_str(content);
        if !content.is_empty() && !content.ends_with('\n') {
            rendered.push('\n');
        }
    }
}
