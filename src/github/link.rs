/// Whether a `Link` response header advertises a `rel="next"` page.
pub fn has_next(link_header: &str) -> bool {
    link_header.split(',').any(|entry| {
        entry.split(';').skip(1).any(|param| {
            let param = param.trim();
            match param.split_once('=') {
                Some((key, value)) => {
                    key.trim().eq_ignore_ascii_case("rel")
                        && value
                            .trim()
                            .trim_matches('"')
                            .split_whitespace()
                            .any(|rel| rel == "next")
                }
                None => false,
            }
        })
    })
}
