/// Identifier for a body in a [`crate::attractor::AttractorSet`].
///
/// Ids are handed out in increasing order by the owning set and are never
/// reused, so an id held by an input collaborator either names the same
/// body or names nothing at all once that body has been removed.
pub type BodyId = u64;
