// src/common/pagination.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Paginação por cursor: o cursor é o id da última linha da página anterior.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageRequest {
    pub cursor: Option<Uuid>,
    pub limit: Option<i64>,
}

impl PageRequest {
    pub fn new(cursor: Option<Uuid>, limit: Option<i64>) -> Self {
        Self { cursor, limit }
    }

    // Sem limite -> 20; fora da faixa -> grampeado em [1, 100]
    pub fn limit(&self) -> i64 {
        self.limit
            .map(|l| l.clamp(1, MAX_PAGE_LIMIT))
            .unwrap_or(DEFAULT_PAGE_LIMIT)
    }

    /// Quantidade pedida ao banco: uma linha a mais para saber se há próxima página.
    pub fn fetch_limit(&self) -> i64 {
        self.limit() + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    // Operador do keyset: "depois do cursor" na ordem escolhida
    pub fn after_operator(self) -> &'static str {
        match self {
            SortOrder::Asc => ">",
            SortOrder::Desc => "<",
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<Uuid>,
    pub has_more: bool,
    pub total: i64,
}

impl<T> Page<T> {
    /// Monta a página a partir de uma busca com `fetch_limit()` linhas (overfetch de uma).
    pub fn from_overfetch(
        mut rows: Vec<T>,
        request: &PageRequest,
        total: i64,
        id_of: impl Fn(&T) -> Uuid,
    ) -> Self {
        let limit = request.limit() as usize;
        let has_more = rows.len() > limit;
        rows.truncate(limit);

        let next_cursor = if has_more { rows.last().map(&id_of) } else { None };

        Self {
            items: rows,
            next_cursor,
            has_more,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(PageRequest::default().limit(), 20);
        assert_eq!(PageRequest::new(None, Some(0)).limit(), 1);
        assert_eq!(PageRequest::new(None, Some(-5)).limit(), 1);
        assert_eq!(PageRequest::new(None, Some(500)).limit(), 100);
        assert_eq!(PageRequest::new(None, Some(37)).limit(), 37);
        assert_eq!(PageRequest::new(None, Some(37)).fetch_limit(), 38);
    }

    #[test]
    fn twenty_five_rows_split_into_twenty_and_five() {
        let ids: Vec<Uuid> = (0..25).map(|_| Uuid::new_v4()).collect();
        let request = PageRequest::new(None, Some(20));

        // O banco devolve fetch_limit() = 21 linhas na primeira consulta.
        let first_fetch = ids[..21].to_vec();
        let first = Page::from_overfetch(first_fetch, &request, 25, |id| *id);

        assert_eq!(first.items.len(), 20);
        assert!(first.has_more);
        assert_eq!(first.next_cursor, Some(ids[19]));
        assert_eq!(first.total, 25);

        // Segunda consulta: linhas estritamente depois do cursor.
        let second_request = PageRequest::new(first.next_cursor, Some(20));
        let cursor_pos = ids.iter().position(|id| Some(*id) == second_request.cursor).unwrap();
        let second_fetch = ids[cursor_pos + 1..].to_vec();
        let second = Page::from_overfetch(second_fetch, &second_request, 25, |id| *id);

        assert_eq!(second.items, ids[20..].to_vec());
        assert!(!second.has_more);
        assert_eq!(second.next_cursor, None);
    }

    #[test]
    fn exact_fit_has_no_next_page() {
        let rows: Vec<Uuid> = (0..20).map(|_| Uuid::new_v4()).collect();
        let page = Page::from_overfetch(rows, &PageRequest::default(), 20, |id| *id);

        assert_eq!(page.items.len(), 20);
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn sort_order_operators() {
        assert_eq!(SortOrder::default(), SortOrder::Desc);
        assert_eq!(SortOrder::Desc.after_operator(), "<");
        assert_eq!(SortOrder::Asc.after_operator(), ">");
    }
}
