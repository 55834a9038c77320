//! Local search over the synchronized resource set

use crate::resource::Resource;

/// Resources matching `query`, in their original order
///
/// A blank query returns everything. Otherwise a resource is kept when any
/// of its name, type, region or url contains the query, ignoring case.
pub fn filter<'a>(resources: &'a [Resource], query: &str) -> Vec<&'a Resource> {
    if query.trim().is_empty() {
        return resources.iter().collect();
    }
    let needle = query.to_lowercase();
    resources
        .iter()
        .filter(|resource| matches(resource, &needle))
        .collect()
}

/// Owned variant of [`filter`] for callers that hand the result elsewhere
pub fn filter_owned(resources: &[Resource], query: &str) -> Vec<Resource> {
    filter(resources, query).into_iter().cloned().collect()
}

fn matches(resource: &Resource, needle: &str) -> bool {
    resource
        .searchable_fields()
        .any(|value| value.to_lowercase().contains(needle))
}
