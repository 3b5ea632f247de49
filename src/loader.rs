//! Paginated list state shared by every list-bearing screen.
//!
//! Each screen owns one `PageState<T>` per list. The state never performs
//! I/O itself: `begin` decides whether a fetch should happen and which page
//! it targets, the app layer runs the request on a spawned task, and the
//! outcome is fed back through `complete` or `fail` together with the
//! `PageRequest` that started it. Responses from superseded requests are
//! identified by their sequence token and dropped without touching state.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Reload from page 1, replacing accumulated items on success.
    Refresh,
    /// Fetch the next page and concatenate.
    Append,
}

/// Ticket for one in-flight fetch. Returned by [`PageState::begin`] and
/// handed back on completion so the state can tell current from stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub mode: LoadMode,
    seq: u64,
}

#[derive(Debug)]
pub struct PageState<T> {
    items: Vec<T>,
    page_number: u32,
    page_size: u32,
    total: u64,
    has_more: bool,
    loading: bool,
    seq: u64,
}

impl<T> PageState<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            page_number: 1,
            page_size,
            total: 0,
            has_more: true,
            loading: false,
            seq: 0,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    #[allow(dead_code)]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Start a load. Returns the request to issue, or `None` when no network
    /// call must happen: a fetch is already in flight (the in-flight request
    /// wins, this call is discarded), or Append is asked past the end.
    pub fn begin(&mut self, mode: LoadMode) -> Option<PageRequest> {
        if self.loading {
            return None;
        }
        let page = match mode {
            LoadMode::Refresh => 1,
            LoadMode::Append => {
                if !self.has_more {
                    return None;
                }
                self.page_number
            }
        };
        self.loading = true;
        self.seq += 1;
        Some(PageRequest {
            page,
            mode,
            seq: self.seq,
        })
    }

    /// Merge a successful page. Items are cleared here, not in `begin`, so a
    /// refresh that fails or is superseded leaves the previous list intact.
    /// Returns false if the request was superseded and nothing changed.
    pub fn complete(&mut self, req: &PageRequest, page_items: Vec<T>, total: u64) -> bool {
        if req.seq != self.seq {
            return false;
        }
        self.loading = false;
        if req.mode == LoadMode::Refresh {
            self.items.clear();
        }
        self.items.extend(page_items);
        self.page_number = req.page + 1;
        self.total = total;
        self.has_more = (self.items.len() as u64) < total;
        true
    }

    /// Record a failed fetch: only the loading guard is released, the list
    /// keeps its pre-call value. Returns false for superseded requests.
    pub fn fail(&mut self, req: &PageRequest) -> bool {
        if req.seq != self.seq {
            return false;
        }
        self.loading = false;
        true
    }

    /// Drop everything and advance the sequence token, orphaning any
    /// in-flight request. Used on screen unmount and when the screen
    /// retargets (new filter, new conversation).
    pub fn reset(&mut self) {
        self.items.clear();
        self.page_number = 1;
        self.total = 0;
        self.has_more = true;
        self.loading = false;
        self.seq += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: usize, from: u32) -> Vec<u32> {
        (from..from + n as u32).collect()
    }

    #[test]
    fn refresh_replaces_append_concatenates() {
        let mut state: PageState<u32> = PageState::new(10);

        let req = state.begin(LoadMode::Refresh).unwrap();
        assert_eq!(req.page, 1);
        assert!(state.complete(&req, page(10, 0), 25));
        assert_eq!(state.len(), 10);

        let req = state.begin(LoadMode::Append).unwrap();
        assert_eq!(req.page, 2);
        assert!(state.complete(&req, page(10, 10), 25));
        assert_eq!(state.len(), 20);
        assert_eq!(state.items()[0], 0);
        assert_eq!(state.items()[19], 19);
    }

    #[test]
    fn has_more_tracks_total_after_every_merge() {
        let mut state: PageState<u32> = PageState::new(10);

        let req = state.begin(LoadMode::Refresh).unwrap();
        state.complete(&req, page(10, 0), 25);
        assert!(state.has_more());

        let req = state.begin(LoadMode::Append).unwrap();
        state.complete(&req, page(10, 10), 25);
        assert!(state.has_more());

        let req = state.begin(LoadMode::Append).unwrap();
        assert_eq!(req.page, 3);
        state.complete(&req, page(5, 20), 25);
        assert_eq!(state.len(), 25);
        assert!(!state.has_more());

        // Further append is a no-op, no request issued
        assert!(state.begin(LoadMode::Append).is_none());
    }

    #[test]
    fn begin_while_loading_is_a_no_op() {
        let mut state: PageState<u32> = PageState::new(10);

        let req = state.begin(LoadMode::Refresh).unwrap();
        assert!(state.begin(LoadMode::Refresh).is_none());
        assert!(state.begin(LoadMode::Append).is_none());

        // The original request still completes normally
        assert!(state.complete(&req, page(10, 0), 25));
        assert_eq!(state.len(), 10);
    }

    #[test]
    fn refresh_resets_next_page_to_two() {
        let mut state: PageState<u32> = PageState::new(10);

        for _ in 0..3 {
            let req = state.begin(LoadMode::Refresh).unwrap();
            state.complete(&req, page(10, 0), 100);
            let req = state.begin(LoadMode::Append).unwrap();
            state.complete(&req, page(10, 10), 100);
        }

        let req = state.begin(LoadMode::Refresh).unwrap();
        state.complete(&req, page(10, 0), 100);
        let req = state.begin(LoadMode::Append).unwrap();
        assert_eq!(req.page, 2);
    }

    #[test]
    fn failure_leaves_items_and_releases_guard() {
        let mut state: PageState<u32> = PageState::new(10);

        let req = state.begin(LoadMode::Refresh).unwrap();
        state.complete(&req, page(10, 0), 25);

        let req = state.begin(LoadMode::Append).unwrap();
        assert!(state.fail(&req));
        assert_eq!(state.len(), 10);
        assert!(!state.is_loading());

        // And the same for a failed refresh: previous list survives
        let req = state.begin(LoadMode::Refresh).unwrap();
        assert!(state.fail(&req));
        assert_eq!(state.len(), 10);
    }

    #[test]
    fn refresh_is_idempotent() {
        let mut once: PageState<u32> = PageState::new(10);
        let req = once.begin(LoadMode::Refresh).unwrap();
        once.complete(&req, page(10, 0), 25);

        let mut twice: PageState<u32> = PageState::new(10);
        for _ in 0..2 {
            let req = twice.begin(LoadMode::Refresh).unwrap();
            twice.complete(&req, page(10, 0), 25);
        }

        assert_eq!(once.items(), twice.items());
        assert_eq!(once.has_more(), twice.has_more());
        assert_eq!(once.total(), twice.total());
        let req = twice.begin(LoadMode::Append).unwrap();
        assert_eq!(req.page, 2);
    }

    #[test]
    fn stale_completion_is_dropped() {
        let mut state: PageState<u32> = PageState::new(10);

        let old = state.begin(LoadMode::Refresh).unwrap();
        state.reset();

        assert!(!state.complete(&old, page(10, 0), 25));
        assert!(state.is_empty());
        assert!(!state.is_loading());
        assert!(!state.fail(&old));
    }

    #[test]
    fn stale_completion_after_retarget_does_not_corrupt_paging() {
        let mut state: PageState<u32> = PageState::new(10);

        // First target: one page loaded, append in flight
        let req = state.begin(LoadMode::Refresh).unwrap();
        state.complete(&req, page(10, 0), 25);
        let in_flight = state.begin(LoadMode::Append).unwrap();

        // Screen retargets; the new refresh lands first
        state.reset();
        let fresh = state.begin(LoadMode::Refresh).unwrap();
        state.complete(&fresh, page(10, 100), 12);

        // Old append arrives late and must not be merged
        assert!(!state.complete(&in_flight, page(10, 10), 25));
        assert_eq!(state.len(), 10);
        assert_eq!(state.total(), 12);
        assert_eq!(state.items()[0], 100);

        let next = state.begin(LoadMode::Append).unwrap();
        assert_eq!(next.page, 2);
    }

    #[test]
    fn duplicates_across_pages_are_kept() {
        let mut state: PageState<u32> = PageState::new(2);

        let req = state.begin(LoadMode::Refresh).unwrap();
        state.complete(&req, vec![7, 8], 4);
        let req = state.begin(LoadMode::Append).unwrap();
        // Backend shifted between pages and re-served item 8
        state.complete(&req, vec![8, 9], 4);

        assert_eq!(state.items(), &[7, 8, 8, 9]);
        assert!(!state.has_more());
    }

    #[test]
    fn reset_restores_initial_shape() {
        let mut state: PageState<u32> = PageState::new(10);
        let req = state.begin(LoadMode::Refresh).unwrap();
        state.complete(&req, page(10, 0), 10);
        assert!(!state.has_more());

        state.reset();
        assert!(state.is_empty());
        assert!(state.has_more());
        assert_eq!(state.total(), 0);
        let req = state.begin(LoadMode::Refresh).unwrap();
        assert_eq!(req.page, 1);
    }

    #[test]
    fn empty_page_closes_the_list() {
        let mut state: PageState<u32> = PageState::new(10);
        let req = state.begin(LoadMode::Refresh).unwrap();
        state.complete(&req, vec![], 0);
        assert!(state.is_empty());
        assert!(!state.has_more());
        assert!(state.begin(LoadMode::Append).is_none());
    }

    #[test]
    fn total_shrinking_below_len_stops_appending() {
        let mut state: PageState<u32> = PageState::new(10);
        let req = state.begin(LoadMode::Refresh).unwrap();
        state.complete(&req, page(10, 0), 30);

        // Backend deleted rows between pages; reported total drops
        let req = state.begin(LoadMode::Append).unwrap();
        state.complete(&req, page(5, 10), 15);
        assert_eq!(state.len(), 15);
        assert!(!state.has_more());
    }
}
