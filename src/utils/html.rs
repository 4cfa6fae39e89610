/// Clean user supplied post and comment text using the ammonia library.
///
/// Whitelist-based: safe inline tags (like <b>, <p>) survive while <script>,
/// <iframe> and event-handler attributes are stripped. Text outside tags is
/// HTML-escaped, so `&`, `<` and `>` come back as entities.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::clean_html;

    #[test]
    fn strips_scripts_and_keeps_text() {
        assert_eq!(clean_html("Content mock first post."), "Content mock first post.");
        assert_eq!(clean_html("hi<script>alert(1)</script>"), "hi");
    }

    #[test]
    fn escapes_ampersands_in_plain_text() {
        assert_eq!(clean_html("Tom & Jerry"), "Tom &amp; Jerry");
    }
}
