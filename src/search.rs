use crate::api::Book;
use crate::app::AppState;

/// Books whose title or author contains `term`, case-insensitively.
///
/// A blank term (after trimming) matches everything. The input slice is
/// never modified.
pub fn filter_books(books: &[Book], term: &str) -> Vec<Book> {
    let q = term.trim().to_lowercase();
    if q.is_empty() {
        return books.to_vec();
    }
    books
        .iter()
        .filter(|b| b.judul.to_lowercase().contains(&q) || b.author.to_lowercase().contains(&q))
        .cloned()
        .collect()
}

/// Recompute the visible list from the cache and the current query.
pub fn apply_search(app: &mut AppState) {
    app.visible = filter_books(&app.books, &app.search_query);
    app.selected_index = app.selected_index.min(app.visible.len().saturating_sub(1));
}
