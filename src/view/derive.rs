use std::collections::BTreeSet;
use std::sync::Arc;

use crate::models::user::User;
use crate::view::collate::CollationKey;
use crate::view::spec::{RoleFilter, SortSpec};

/// Filter then order `collection` into a new sequence.
///
/// Pure and total. The input is never modified, and records with equal
/// sort keys keep their incoming relative order.
pub fn derive(collection: &[User], filter: &RoleFilter, sort: SortSpec) -> Vec<User> {
    let retained = collection.iter().filter(|user| filter.matches(user));

    match sort {
        SortSpec::None => retained.cloned().collect(),
        SortSpec::AgeAsc => ordered_by(retained, |u| u.age, false),
        SortSpec::AgeDesc => ordered_by(retained, |u| u.age, true),
        SortSpec::NameAsc => ordered_by(retained, |u| CollationKey::new(&u.full_name()), false),
        SortSpec::NameDesc => ordered_by(retained, |u| CollationKey::new(&u.full_name()), true),
    }
}

// Keys are computed once per record; `sort_by` is stable.
fn ordered_by<'a, K, I, F>(users: I, key: F, descending: bool) -> Vec<User>
where
    K: Ord,
    I: Iterator<Item = &'a User>,
    F: Fn(&User) -> K,
{
    let mut keyed: Vec<(K, &User)> = users.map(|u| (key(u), u)).collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = a.cmp(b);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });

    keyed.into_iter().map(|(_, u)| u.clone()).collect()
}

/// Distinct roles present in `collection`, sorted
pub fn available_roles(collection: &[User]) -> Vec<String> {
    collection
        .iter()
        .map(|user| user.role.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Memoized `derive`, keyed on collection identity plus filter and sort.
/// A miss always recomputes, so a stale hit is impossible.
#[derive(Debug, Default)]
pub struct ProjectionCache {
    entry: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    collection: Arc<Vec<User>>,
    filter: RoleFilter,
    sort: SortSpec,
    projection: Arc<Vec<User>>,
}

impl ProjectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_derive(
        &mut self,
        collection: &Arc<Vec<User>>,
        filter: &RoleFilter,
        sort: SortSpec,
    ) -> Arc<Vec<User>> {
        if let Some(entry) = &self.entry {
            if Arc::ptr_eq(&entry.collection, collection)
                && entry.filter == *filter
                && entry.sort == sort
            {
                return Arc::clone(&entry.projection);
            }
        }

        let projection = Arc::new(derive(collection, filter, sort));
        self.entry = Some(CacheEntry {
            collection: Arc::clone(collection),
            filter: filter.clone(),
            sort,
            projection: Arc::clone(&projection),
        });

        projection
    }
}
