use crate::feature::Feature;
use crate::viewport::Viewport;

/// Every edit the document accepts. Applied through [`crate::Editor::apply`]
/// so that each one lands in the undo history.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Add(Feature),
    AddMany(Vec<Feature>),
    /// Replace the feature with the same id in place.
    Update(Feature),
    /// Upsert; replaced features move to the end.
    UpdateMany(Vec<Feature>),
    /// Absolute: listed ids become visible, all others hidden.
    SetVisible(Vec<String>),
    Delete(Vec<String>),
    Duplicate(Vec<String>),
    SetViewport(Viewport),
}

impl Mutation {
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::Add(_) => "add",
            Mutation::AddMany(_) => "add_many",
            Mutation::Update(_) => "update",
            Mutation::UpdateMany(_) => "update_many",
            Mutation::SetVisible(_) => "set_visible",
            Mutation::Delete(_) => "delete",
            Mutation::Duplicate(_) => "duplicate",
            Mutation::SetViewport(_) => "set_viewport",
        }
    }
}
