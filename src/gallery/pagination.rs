//! Page slicing and page-control windowing.

/// One item of the visible page, paired with its position in the full
/// collection (the lightbox navigates across every page).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageEntry<'a, T> {
    pub global_index: usize,
    pub item: &'a T,
}

/// A single element of the pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    Prev { enabled: bool },
    Page { number: usize, active: bool },
    Ellipsis,
    Next { enabled: bool },
}

impl PageControl {
    /// Page requested when this control is activated.
    pub fn target(&self, current_page: usize) -> Option<usize> {
        match *self {
            PageControl::Prev { enabled: true } => current_page.checked_sub(1),
            PageControl::Next { enabled: true } => Some(current_page + 1),
            PageControl::Page { number, .. } => Some(number),
            _ => None,
        }
    }
}

/// Number of pages for `len` items. An empty collection still has one
/// (empty) page.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    len.div_ceil(page_size).max(1)
}

/// 1-based page containing the item at `index`.
pub fn page_of(index: usize, page_size: usize) -> usize {
    index / page_size.max(1) + 1
}

/// Items of `page` (1-based) with their global indices.
pub fn slice<T>(items: &[T], page: usize, page_size: usize) -> Vec<PageEntry<'_, T>> {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if page == 0 || start >= items.len() {
        return Vec::new();
    }
    let end = (start + page_size).min(items.len());

    items[start..end]
        .iter()
        .enumerate()
        .map(|(offset, item)| PageEntry {
            global_index: start + offset,
            item,
        })
        .collect()
}

/// Build the pagination bar for `current_page`.
///
/// A window of at most `max_visible` page numbers is centred on the current
/// page and clamped to `[1, total_pages]`. The first and last pages are
/// always reachable, with an ellipsis standing in for any skipped run.
pub fn compute_controls(
    current_page: usize,
    total_pages: usize,
    max_visible: usize,
) -> Vec<PageControl> {
    if total_pages <= 1 {
        return Vec::new();
    }

    let max_visible = max_visible.max(1);
    let current_page = current_page.clamp(1, total_pages);

    let mut start = current_page.saturating_sub(max_visible / 2).max(1);
    let end = (start + max_visible - 1).min(total_pages);
    if end - start < max_visible - 1 {
        start = end.saturating_sub(max_visible - 1).max(1);
    }

    let page = |number: usize| PageControl::Page {
        number,
        active: number == current_page,
    };

    let mut controls = Vec::with_capacity(max_visible + 6);
    controls.push(PageControl::Prev {
        enabled: current_page > 1,
    });

    if start > 1 {
        controls.push(page(1));
        if start > 2 {
            controls.push(PageControl::Ellipsis);
        }
    }

    controls.extend((start..=end).map(page));

    if end < total_pages {
        if end < total_pages - 1 {
            controls.push(PageControl::Ellipsis);
        }
        controls.push(page(total_pages));
    }

    controls.push(PageControl::Next {
        enabled: current_page < total_pages,
    });
    controls
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_numbers(controls: &[PageControl]) -> Vec<usize> {
        controls
            .iter()
            .filter_map(|c| match c {
                PageControl::Page { number, .. } => Some(*number),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 14), 1);
        assert_eq!(total_pages(14, 14), 1);
        assert_eq!(total_pages(15, 14), 2);
        assert_eq!(total_pages(28, 14), 2);
        assert_eq!(total_pages(29, 14), 3);
    }

    #[test]
    fn test_page_of() {
        assert_eq!(page_of(0, 14), 1);
        assert_eq!(page_of(13, 14), 1);
        assert_eq!(page_of(14, 14), 2);
    }

    #[test]
    fn test_slice_partitions_collection() {
        let items: Vec<u32> = (0..47).collect();
        for page_size in [1, 5, 14, 47, 100] {
            let pages = total_pages(items.len(), page_size);
            let mut seen = Vec::new();
            for page in 1..=pages {
                let entries = slice(&items, page, page_size);
                assert!(entries.len() <= page_size);
                for entry in entries {
                    assert_eq!(*entry.item as usize, entry.global_index);
                    seen.push(*entry.item);
                }
            }
            assert_eq!(seen, items, "page size {page_size}");
        }
    }

    #[test]
    fn test_slice_out_of_range() {
        let items = [1, 2, 3];
        assert!(slice(&items, 0, 2).is_empty());
        assert!(slice(&items, 3, 2).is_empty());
        let empty: [u8; 0] = [];
        assert!(slice(&empty, 1, 14).is_empty());
    }

    #[test]
    fn test_single_page_has_no_controls() {
        assert!(compute_controls(1, 1, 5).is_empty());
        assert!(compute_controls(3, 1, 5).is_empty());
        assert!(compute_controls(1, 0, 5).is_empty());
    }

    #[test]
    fn test_controls_small_total() {
        let controls = compute_controls(1, 3, 5);
        assert_eq!(
            controls,
            vec![
                PageControl::Prev { enabled: false },
                PageControl::Page { number: 1, active: true },
                PageControl::Page { number: 2, active: false },
                PageControl::Page { number: 3, active: false },
                PageControl::Next { enabled: true },
            ]
        );
    }

    #[test]
    fn test_controls_middle_window() {
        let controls = compute_controls(10, 20, 5);
        assert_eq!(
            controls,
            vec![
                PageControl::Prev { enabled: true },
                PageControl::Page { number: 1, active: false },
                PageControl::Ellipsis,
                PageControl::Page { number: 8, active: false },
                PageControl::Page { number: 9, active: false },
                PageControl::Page { number: 10, active: true },
                PageControl::Page { number: 11, active: false },
                PageControl::Page { number: 12, active: false },
                PageControl::Ellipsis,
                PageControl::Page { number: 20, active: false },
                PageControl::Next { enabled: true },
            ]
        );
    }

    #[test]
    fn test_controls_window_shifts_at_end() {
        let controls = compute_controls(20, 20, 5);
        assert_eq!(page_numbers(&controls), vec![1, 16, 17, 18, 19, 20]);
        assert_eq!(controls.last(), Some(&PageControl::Next { enabled: false }));
    }

    #[test]
    fn test_controls_no_ellipsis_for_adjacent_edge() {
        // Window 2..=6 touches page 1, so no gap marker before it.
        let controls = compute_controls(4, 8, 5);
        assert_eq!(page_numbers(&controls), vec![1, 2, 3, 4, 5, 6, 8]);
        assert_eq!(
            controls
                .iter()
                .filter(|c| **c == PageControl::Ellipsis)
                .count(),
            1
        );
    }

    #[test]
    fn test_controls_invariants_exhaustive() {
        for total in 2..40 {
            for current in 1..=total {
                for max_visible in 1..8 {
                    let controls = compute_controls(current, total, max_visible);
                    assert!(matches!(controls.first(), Some(PageControl::Prev { .. })));
                    assert!(matches!(controls.last(), Some(PageControl::Next { .. })));

                    for pair in controls.windows(2) {
                        assert!(
                            !(pair[0] == PageControl::Ellipsis && pair[1] == PageControl::Ellipsis)
                        );
                    }

                    let numbers = page_numbers(&controls);
                    assert!(numbers.iter().all(|n| (1..=total).contains(n)));
                    assert!(numbers.windows(2).all(|w| w[0] < w[1]));
                    assert!(numbers.contains(&1) && numbers.contains(&total));
                    assert!(numbers.contains(&current));

                    let active: Vec<_> = controls
                        .iter()
                        .filter(|c| matches!(c, PageControl::Page { active: true, .. }))
                        .collect();
                    assert_eq!(active.len(), 1);
                }
            }
        }
    }

    #[test]
    fn test_control_targets() {
        assert_eq!(PageControl::Prev { enabled: true }.target(3), Some(2));
        assert_eq!(PageControl::Prev { enabled: false }.target(1), None);
        assert_eq!(PageControl::Next { enabled: true }.target(3), Some(4));
        assert_eq!(PageControl::Ellipsis.target(3), None);
        assert_eq!(
            PageControl::Page { number: 7, active: false }.target(3),
            Some(7)
        );
    }
}
