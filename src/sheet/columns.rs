use std::collections::HashMap;
use std::sync::LazyLock;

/// Book fields in import order, each with its accepted header spellings.
/// Latin spellings come first so they win over the localized ones.
pub const BOOK_HEADERS: &[(BookField, &[&str])] = &[
    (BookField::Id, &["ID", "id"]),
    (BookField::Title, &["Title", "title", "제목"]),
    (BookField::Author, &["Author", "author", "저자"]),
    (BookField::Publisher, &["Publisher", "publisher", "출판사"]),
    (BookField::Isbn, &["ISBN", "isbn"]),
    (BookField::Category, &["Category", "category", "분류"]),
    (BookField::ClassCode, &["ClassCode", "classCode", "청구기호"]),
];

pub const USER_HEADERS: &[(UserField, &[&str])] = &[
    (UserField::Id, &["ID", "id"]),
    (UserField::Name, &["Name", "name", "이름"]),
    (UserField::StudentId, &["StudentID", "studentId", "학번"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookField {
    Id,
    Title,
    Author,
    Publisher,
    Isbn,
    Category,
    ClassCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Id,
    Name,
    StudentId,
}

pub static BOOK_COLUMNS: LazyLock<ColumnTable<BookField>> =
    LazyLock::new(|| ColumnTable::new(BOOK_HEADERS));
pub static USER_COLUMNS: LazyLock<ColumnTable<UserField>> =
    LazyLock::new(|| ColumnTable::new(USER_HEADERS));

/// Header spelling -> (field, precedence) lookup, built once per entity.
#[derive(Debug)]
pub struct ColumnTable<F> {
    fields: Vec<F>,
    by_header: HashMap<&'static str, (usize, usize)>,
}

impl<F: Copy + Eq> ColumnTable<F> {
    #[must_use]
    pub fn new(aliases: &[(F, &'static [&'static str])]) -> Self {
        let mut by_header = HashMap::new();
        let mut fields = Vec::with_capacity(aliases.len());
        for (field_idx, (field, headers)) in aliases.iter().enumerate() {
            fields.push(*field);
            for (precedence, header) in headers.iter().enumerate() {
                by_header.insert(*header, (field_idx, precedence));
            }
        }
        Self { fields, by_header }
    }

    /// Match a sheet's header row against the table.
    ///
    /// For every field the result lists the sheet columns carrying one of its
    /// spellings, highest precedence first.
    #[must_use]
    pub fn resolve<S: AsRef<str>>(&self, header_row: &[S]) -> HeaderIndex<F> {
        let mut candidates: Vec<Vec<(usize, usize)>> = vec![Vec::new(); self.fields.len()];
        for (col, header) in header_row.iter().enumerate() {
            if let Some(&(field_idx, precedence)) = self.by_header.get(header.as_ref().trim()) {
                candidates[field_idx].push((precedence, col));
            }
        }
        let columns = candidates
            .into_iter()
            .map(|mut cols| {
                cols.sort_unstable();
                cols.into_iter().map(|(_, col)| col).collect()
            })
            .collect();
        HeaderIndex {
            fields: self.fields.clone(),
            columns,
        }
    }
}

/// Per-sheet resolution of fields to column positions.
#[derive(Debug, Clone)]
pub struct HeaderIndex<F> {
    fields: Vec<F>,
    columns: Vec<Vec<usize>>,
}

impl<F: Copy + Eq> HeaderIndex<F> {
    /// Columns for `field`, in precedence order.
    #[must_use]
    pub fn columns(&self, field: F) -> &[usize] {
        match self.fields.iter().position(|f| *f == field) {
            Some(idx) => &self.columns[idx],
            None => &[],
        }
    }

    /// True when at least one header in the sheet was recognized.
    #[must_use]
    pub fn any_recognized(&self) -> bool {
        self.columns.iter().any(|cols| !cols.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_header_wins_over_localized() {
        let index = BOOK_COLUMNS.resolve(&["제목", "ISBN", "Title"]);
        assert_eq!(index.columns(BookField::Title), &[2, 0]);
        assert_eq!(index.columns(BookField::Isbn), &[1]);
        assert!(index.columns(BookField::Author).is_empty());
    }

    #[test]
    fn lowercase_export_headers_are_recognized() {
        let index = USER_COLUMNS.resolve(&["id", "name", "studentId"]);
        assert_eq!(index.columns(UserField::Id), &[0]);
        assert_eq!(index.columns(UserField::StudentId), &[2]);
    }

    #[test]
    fn unknown_headers_are_ignored() {
        let index = USER_COLUMNS.resolve(&["nickname", "status"]);
        assert!(!index.any_recognized());
    }
}
