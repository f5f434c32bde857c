use sea_orm::{EntityTrait, Select};

/// Optional-filter composition for query builders.
///
/// Each filter is applied only when its parameter is present; an absent
/// parameter returns the query unchanged, so filters chain freely.
pub trait FilterIfPresent: Sized {
    fn filter_if_present<T, F>(self, value: Option<T>, apply: F) -> Self
    where
        F: FnOnce(Self, T) -> Self;
}

impl<E> FilterIfPresent for Select<E>
where
    E: EntityTrait,
{
    fn filter_if_present<T, F>(self, value: Option<T>, apply: F) -> Self
    where
        F: FnOnce(Self, T) -> Self,
    {
        match value {
            Some(v) => apply(self, v),
            None => self,
        }
    }
}
