//! Page resolution for the employee listing.

/// The page to show and whether the requested `page` value needs correcting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-indexed, always within `1..=total_pages` (or 1 when empty)
    pub page: usize,
    pub total_pages: usize,
    /// The raw value was missing, unparsable or out of range
    pub corrected: bool,
}

impl PageInfo {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Target for "next", if there is one
    pub fn next(&self) -> Option<usize> {
        self.go_to(self.page + 1)
    }

    pub fn previous(&self) -> Option<usize> {
        self.page.checked_sub(1).and_then(|page| self.go_to(page))
    }

    /// `Some(page)` when `page` is a valid target
    pub fn go_to(&self, page: usize) -> Option<usize> {
        (1..=self.total_pages).contains(&page).then_some(page)
    }

    /// 0-indexed item range of the current page, clipped to `total_items`
    pub fn range(&self, total_items: usize, per_page: usize) -> std::ops::Range<usize> {
        let start = ((self.page - 1) * per_page).min(total_items);
        let end = (start + per_page).min(total_items);
        start..end
    }
}

pub fn total_pages(total_items: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    total_items.div_ceil(per_page)
}

/// Resolve the `page` query value against the number of items.
///
/// Only the leading integer counts, so `"2abc"` asks for page 2. Values too large
/// for an `i64` saturate and end up on the last page.
pub fn resolve_page(raw: Option<&str>, total_items: usize, per_page: usize) -> PageInfo {
    let total_pages = total_pages(total_items, per_page);
    let raw = raw.map(str::trim);
    let requested = raw.and_then(leading_number);

    let page = match requested {
        _ if total_pages == 0 => 1,
        Some(page) => page.clamp(1, total_pages as i64) as usize,
        None => 1,
    };
    let corrected = raw != Some(page.to_string().as_str());

    PageInfo {
        page,
        total_pages,
        corrected,
    }
}

/// Optional sign followed by at least one ASCII digit; trailing text is ignored
fn leading_number(raw: &str) -> Option<i64> {
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let digits: Vec<i64> = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .map(|b| i64::from(b - b'0'))
        .collect();
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits
        .into_iter()
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(d));
    Some(if negative { -magnitude } else { magnitude })
}

/// Items shown on the resolved page
pub fn page_items<'a, T>(items: &'a [T], info: &PageInfo, per_page: usize) -> &'a [T] {
    &items[info.range(items.len(), per_page)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_page_is_clamped_to_last() {
        let info = resolve_page(Some("99"), 25, 10);
        assert_eq!(info.total_pages, 3);
        assert_eq!(info.page, 3);
        assert!(info.corrected);
    }

    #[test]
    fn test_valid_page_is_kept() {
        let info = resolve_page(Some("2"), 25, 10);
        assert_eq!(info.page, 2);
        assert!(!info.corrected);
        assert!(info.has_next());
        assert!(info.has_previous());
    }

    #[test]
    fn test_missing_or_garbage_page_falls_back_to_first() {
        for raw in [None, Some("abc"), Some(""), Some("0"), Some("-4")] {
            let info = resolve_page(raw, 25, 10);
            assert_eq!(info.page, 1, "raw = {:?}", raw);
            assert!(info.corrected, "raw = {:?}", raw);
        }
    }

    #[test]
    fn test_page_with_trailing_text_uses_leading_digits() {
        let info = resolve_page(Some("2abc"), 25, 10);
        assert_eq!(info.page, 2);
        assert!(info.corrected);

        let info = resolve_page(Some(" 3 "), 25, 10);
        assert_eq!(info.page, 3);
        assert!(!info.corrected);
    }

    #[test]
    fn test_huge_page_saturates_to_last() {
        let info = resolve_page(Some("99999999999999999999"), 25, 10);
        assert_eq!(info.page, 3);
        assert!(info.corrected);

        let info = resolve_page(Some("-99999999999999999999"), 25, 10);
        assert_eq!(info.page, 1);
    }

    #[test]
    fn test_empty_list_shows_page_one() {
        let info = resolve_page(Some("1"), 0, 10);
        assert_eq!(info.total_pages, 0);
        assert_eq!(info.page, 1);
        assert!(!info.corrected);
        assert!(!info.has_next());
        assert_eq!(info.range(0, 10), 0..0);

        assert!(resolve_page(Some("5"), 0, 10).corrected);
    }

    #[test]
    fn test_navigation_targets() {
        let info = resolve_page(Some("1"), 25, 10);
        assert_eq!(info.previous(), None);
        assert_eq!(info.next(), Some(2));
        assert_eq!(info.go_to(3), Some(3));
        assert_eq!(info.go_to(4), None);
        assert_eq!(info.go_to(0), None);
    }

    #[test]
    fn test_page_items_last_page_is_partial() {
        let items: Vec<u32> = (1..=25).collect();
        let info = resolve_page(Some("3"), items.len(), 10);
        assert_eq!(page_items(&items, &info, 10), &[21, 22, 23, 24, 25]);
    }

    #[test]
    fn test_page_items_outlives_page_info() {
        let items = vec!["a", "b", "c"];
        let visible = {
            let info = resolve_page(None, items.len(), 2);
            page_items(&items, &info, 2)
        };
        assert_eq!(visible, &["a", "b"]);
    }
}
