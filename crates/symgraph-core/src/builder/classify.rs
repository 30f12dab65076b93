//! Special member detection.

use crate::model::{Function, Module, ScopeId, SpecialMember};

/// Which special member role `function` plays for the type `owner`, if any.
///
/// Parameter lists include the implicit object parameter, so a default
/// constructor has one parameter of the owning type and a copy constructor
/// two.
///
/// - **Constructor**: same name as the type, one parameter of the type.
/// - **Copy constructor**: same name as the type, two parameters of the type.
/// - **Destructor**: `~` followed by the type's name.
/// - **Assignment operator**: name ends with `operator=`, two parameters,
///   the second of the type.
///
/// A function named like the type that fits neither constructor shape plays
/// no role.
pub fn classify(module: &Module, owner: ScopeId, function: &Function) -> Option<SpecialMember>
{
    let owner_name = module.scope(owner).name();
    let parameters = &function.parameters;
    let of_owner = |index: usize| parameters.get(index).is_some_and(|parameter| parameter.ty == owner);

    if function.name.hash() == owner_name.hash() {
        return match parameters.len() {
            1 if of_owner(0) => Some(SpecialMember::Constructor),
            2 if of_owner(0) && of_owner(1) => Some(SpecialMember::CopyConstructor),
            _ => None,
        };
    }

    let name = function.name.text();
    if name.strip_prefix('~') == Some(owner_name.text()) {
        return Some(SpecialMember::Destructor);
    }

    if name.ends_with("operator=") && parameters.len() == 2 && of_owner(1) {
        return Some(SpecialMember::AssignmentOperator);
    }

    None
}
