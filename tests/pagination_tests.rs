use cobalto_table::pagination::{
    PageWindow, Paginator, last_page, resolve_page, resolve_rows_number,
};

#[test]
fn test_rows_number_from_request_or_default() {
    assert_eq!(resolve_rows_number(Some("5"), Some(20), None), Some(5));
    assert_eq!(resolve_rows_number(Some(" 7 "), None, None), Some(7));
    assert_eq!(resolve_rows_number(Some("0"), Some(20), None), Some(20));
    assert_eq!(resolve_rows_number(Some("-3"), Some(20), None), Some(20));
    assert_eq!(resolve_rows_number(Some("many"), Some(20), None), Some(20));
    assert_eq!(resolve_rows_number(None, Some(20), None), Some(20));
    assert_eq!(resolve_rows_number(None, None, None), None);
}

#[test]
fn test_requested_rows_number_is_capped() {
    assert_eq!(resolve_rows_number(Some("100000"), Some(20), Some(100)), Some(100));
    assert_eq!(resolve_rows_number(Some("50"), Some(20), Some(100)), Some(50));
    assert_eq!(resolve_rows_number(Some("4294967295"), None, Some(100)), Some(100));
    // The cap only bounds request values.
    assert_eq!(resolve_rows_number(None, Some(500), Some(100)), Some(500));
}

#[test]
fn test_last_page() {
    assert_eq!(last_page(0, Some(10)), 1);
    assert_eq!(last_page(10, Some(10)), 1);
    assert_eq!(last_page(11, Some(10)), 2);
    assert_eq!(last_page(11, None), 1);
    assert_eq!(last_page(11, Some(0)), 1);
}

#[test]
fn test_page_from_request() {
    assert_eq!(resolve_page(Some("3")), 3);
    assert_eq!(resolve_page(Some("0")), 1);
    assert_eq!(resolve_page(Some("last")), 1);
    assert_eq!(resolve_page(None), 1);
}

#[test]
fn test_page_window_offsets() {
    assert_eq!(PageWindow::new(20, 1), PageWindow { limit: 20, offset: 0 });
    assert_eq!(PageWindow::new(5, 3), PageWindow { limit: 5, offset: 10 });
}

#[test]
fn test_paginator_bounds() {
    let paginator = Paginator::new(vec![11, 12, 13], 13, Some(5), 3);
    assert_eq!(paginator.last_page(), 3);
    assert_eq!(paginator.first_item(), Some(11));
    assert_eq!(paginator.last_item(), Some(13));
    assert_eq!(paginator.window(), Some(PageWindow { limit: 5, offset: 10 }));
    assert!(paginator.has_pages());
}

#[test]
fn test_empty_paginator() {
    let paginator: Paginator<i32> = Paginator::new(Vec::new(), 0, Some(10), 1);
    assert_eq!(paginator.last_page(), 1);
    assert_eq!(paginator.first_item(), None);
    assert_eq!(paginator.last_item(), None);
    assert!(paginator.links().is_empty());
}

#[test]
fn test_unpaginated_paginator_has_single_page() {
    let paginator = Paginator::new(vec![1, 2, 3], 3, None, 4);
    assert_eq!(paginator.current_page(), 1);
    assert_eq!(paginator.last_page(), 1);
    assert_eq!(paginator.window(), None);
    assert_eq!(paginator.first_item(), Some(1));
}

#[test]
fn test_out_of_range_page_is_clamped() {
    let paginator = Paginator::new(vec![9, 10], 10, Some(4), 7);
    assert_eq!(paginator.current_page(), 3);
    assert_eq!(paginator.first_item(), Some(9));
    assert_eq!(paginator.last_item(), Some(10));

    let paginator = Paginator::new(vec![1], 10, Some(u32::MAX), u32::MAX);
    assert_eq!(paginator.current_page(), 1);
    assert_eq!(paginator.first_item(), Some(1));
}

#[test]
fn test_page_links() {
    let paginator = Paginator::new(vec![1, 2], 6, Some(2), 1);
    let links = paginator.links();
    let labels: Vec<&str> = links.iter().map(|l| l.label.as_str()).collect();
    assert_eq!(labels, vec!["«", "1", "2", "3", "»"]);
    assert!(links[0].is_disabled());
    assert!(links[1].active);
    assert_eq!(links[4].page, Some(2));

    let last = Paginator::new(vec![5, 6], 6, Some(2), 3).links();
    assert_eq!(last[0].page, Some(2));
    assert!(last[4].is_disabled());
}

fn labels<M>(paginator: &Paginator<M>) -> Vec<String> {
    paginator.links().into_iter().map(|link| link.label).collect()
}

#[test]
fn test_page_links_are_windowed() {
    let middle = Paginator::new(vec![0u8], 100, Some(1), 50);
    assert_eq!(
        labels(&middle),
        vec!["«", "1", "…", "48", "49", "50", "51", "52", "…", "100", "»"]
    );
    let links = middle.links();
    assert!(links[2].is_disabled());
    assert!(links[5].active);

    let first = Paginator::new(vec![0u8], 100, Some(1), 1);
    assert_eq!(labels(&first), vec!["«", "1", "2", "3", "…", "100", "»"]);

    let near_start = Paginator::new(vec![0u8], 100, Some(1), 4);
    assert_eq!(
        labels(&near_start),
        vec!["«", "1", "2", "3", "4", "5", "6", "…", "100", "»"]
    );

    let last = Paginator::new(vec![0u8], 100, Some(1), 100);
    assert_eq!(labels(&last), vec!["«", "1", "…", "98", "99", "100", "»"]);
}

#[test]
fn test_page_links_stay_bounded_for_many_pages() {
    let paginator = Paginator::new(vec![0u8], 5010, Some(1), 2500);
    assert!(paginator.links().len() <= 11);
}
