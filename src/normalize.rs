//! Record normalization: order-field reconciliation and the menu/permission
//! partition.

use crate::record::{MenuRecord, RecordType, MENU_TYPE_MENU, MENU_TYPE_PERMISSION};

/// Resolve the canonical order from the three server spellings.
///
/// First non-falsy value wins with precedence `order > ord > sort`; `0` counts
/// as falsy. When nothing is truthy the `sort` value is returned as-is, so an
/// explicit `0` survives while all-absent stays absent.
pub fn resolve_order(order: Option<i64>, ord: Option<i64>, sort: Option<i64>) -> Option<i64> {
    let truthy = |v: Option<i64>| v.filter(|n| *n != 0);
    truthy(order).or(truthy(ord)).or(sort)
}

/// Rewrite `order` on a freshly fetched record. Applied once at load time.
pub fn normalize_order(mut record: MenuRecord) -> MenuRecord {
    record.order = resolve_order(record.order, record.ord, record.sort);
    record
}

/// `type` absent, falsy or `1`.
pub fn is_menu_candidate(record: &MenuRecord) -> bool {
    match &record.menu_type {
        None => true,
        Some(t) => t.is_falsy() || t.code() == Some(MENU_TYPE_MENU),
    }
}

pub fn is_permission_candidate(record: &MenuRecord) -> bool {
    record.menu_type.as_ref().and_then(RecordType::code) == Some(MENU_TYPE_PERMISSION)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuPartition {
    /// `type` falsy or `1`, ids coerced to text.
    pub menu_candidates: Vec<MenuRecord>,
    /// `type == 2`.
    pub permission_candidates: Vec<MenuRecord>,
}

/// Split a flat list into menu and permission candidates.
/// Records of any other type land in neither.
pub fn split_menus(records: &[MenuRecord]) -> MenuPartition {
    let mut partition = MenuPartition::default();
    for record in records {
        if is_menu_candidate(record) {
            let mut menu = record.clone();
            menu.id = menu.id.into_text();
            menu.parent_id = menu.parent_id.map(|p| p.into_text());
            partition.menu_candidates.push(menu);
        } else if is_permission_candidate(record) {
            partition.permission_candidates.push(record.clone());
        }
    }
    partition
}

/// Permission codes in source order, duplicates kept.
pub fn extract_permission_codes(records: &[MenuRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|r| is_permission_candidate(r))
        .filter_map(|r| r.code.clone())
        .collect()
}
