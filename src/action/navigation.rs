use anyhow::ensure;

use crate::object::DomainObject;

/// Build the browse URL for an object given its path
///
/// The path is leaf first, as returned by the store, the URL lists the
/// keys root first. Unresolved ancestors are skipped.
pub(crate) fn browse_url(
    prefix: &str,
    object: &DomainObject,
    path: &[Option<DomainObject>],
) -> anyhow::Result<String> {
    let keys: Vec<String> = path
        .iter()
        .rev()
        .flatten()
        .map(|ancestor| ancestor.identifier().key)
        .collect();

    ensure!(
        !keys.is_empty(),
        "no path found for object '{}'",
        object.identifier()
    );

    Ok(format!("{prefix}{}", keys.join("/")))
}
