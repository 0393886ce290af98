//! Integration tests for shim assembly scanning and model validation.

use unbreaker::prelude::*;
use unbreaker::shim::markers::MARKER_NAMESPACE;
use unbreaker::shim::model::EXTENSION_MARKER_METHOD;
use unbreaker::shim::RenameData;

fn marker(name: &str, args: Vec<AttrValue>) -> CustomAttribute {
    CustomAttribute::new(
        TypeRefPath::new(AssemblyName::unversioned("Shim"), MARKER_NAMESPACE, name),
        args,
    )
}

fn shim_pair(set: &mut AssemblySet) -> (AsmId, AsmId) {
    let target = AssemblyBuilder::new("Contoso.Core", Version::new(2, 0, 0, 0)).build(set);
    let shim = AssemblyBuilder::new("Contoso.Core.Shims", Version::new(1, 0, 0, 0))
        .attribute(marker(
            "ShimAttribute",
            vec![AttrValue::String("Contoso.Core".into())],
        ))
        .build(set);
    (target, shim)
}

fn widget_sig(set: &AssemblySet, target: AsmId) -> TypeSig {
    TypeSig::Named(TypeRefPath::new(
        set.assembly(target).name.clone(),
        "Contoso",
        "Widget",
    ))
}

#[test]
fn test_marker_kinds_are_inferred() -> Result<()> {
    let mut set = AssemblySet::new();
    let (target, shim) = shim_pair(&mut set);
    TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);

    TypeBuilder::new(shim, "Contoso", "Gadget").build(&mut set);
    TypeBuilder::new(shim, "Contoso", "Widget")
        .attribute(marker(
            "ReplaceAttribute",
            vec![AttrValue::Type(widget_sig(&set, target))],
        ))
        .build(&mut set);
    TypeBuilder::new(shim, "Contoso", "WidgetHelpers")
        .static_type()
        .attribute(marker(
            "ExtensionAttribute",
            vec![AttrValue::Type(widget_sig(&set, target))],
        ))
        .build(&mut set);

    let model = ShimModel::from_assembly(&set, shim)?;
    let kinds: Vec<(ShimTypeKind, String)> = model
        .all_types
        .iter()
        .map(|t| (t.kind, t.target.full_name()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (ShimTypeKind::New, "Contoso.Gadget".to_string()),
            (ShimTypeKind::Replace, "Contoso.Widget".to_string()),
            (ShimTypeKind::UnbreakerExtension, "Contoso.Widget".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn test_constructor_marker_maps_to_ctor() -> Result<()> {
    let mut set = AssemblySet::new();
    let (target, shim) = shim_pair(&mut set);
    TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);

    let shim_widget = TypeBuilder::new(shim, "Contoso", "Widget")
        .attribute(marker(
            "ReplaceAttribute",
            vec![AttrValue::Type(widget_sig(&set, target))],
        ))
        .build(&mut set);
    MethodBuilder::new(
        shim_widget,
        "Create",
        MethodSig::stat(
            widget_sig(&set, target),
            vec![TypeSig::Primitive(Primitive::I4)],
        ),
    )
    .attribute(marker("ConstructorAttribute", Vec::new()))
    .build(&mut set);

    let model = ShimModel::from_assembly(&set, shim)?;
    let method = model.all_types[0].methods().next().expect("one method shim");
    assert!(method.is_constructor_shim);
    assert_eq!(method.target.name, ".ctor");
    match &method.target.signature {
        MemberRefSig::Method(sig) => {
            assert!(sig.has_this);
            assert_eq!(sig.return_type, TypeSig::Primitive(Primitive::Void));
            assert_eq!(sig.params, vec![TypeSig::Primitive(Primitive::I4)]);
        }
        other => panic!("unexpected signature {other:?}"),
    }
    Ok(())
}

#[test]
fn test_field_shimmed_property_targets_field() -> Result<()> {
    let mut set = AssemblySet::new();
    let (target, shim) = shim_pair(&mut set);
    TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);

    let shim_widget = TypeBuilder::new(shim, "Contoso", "Widget")
        .attribute(marker(
            "ReplaceAttribute",
            vec![AttrValue::Type(widget_sig(&set, target))],
        ))
        .build(&mut set);
    let count = PropertyBuilder::new(
        shim_widget,
        "Count",
        PropertySig::instance(TypeSig::Primitive(Primitive::I4)),
    )
    .getter(Accessibility::Public)
    .setter(Accessibility::Public)
    .attribute(marker("FieldAttribute", Vec::new()))
    .build(&mut set);

    let model = ShimModel::from_assembly(&set, shim)?;
    let field = model.all_types[0].fields().next().expect("one field shim");
    assert_eq!(field.source, ShimFieldSource::Property(count));
    assert_eq!(field.target.name, "Count");
    match &field.target.signature {
        MemberRefSig::Field(sig) => assert_eq!(*sig, TypeSig::Primitive(Primitive::I4)),
        other => panic!("unexpected signature {other:?}"),
    }
    // the accessors do not surface as independent method shims
    assert_eq!(model.all_types[0].methods().count(), 0);
    Ok(())
}

#[test]
fn test_native_extension_methods_resolve_implementations() -> Result<()> {
    let mut set = AssemblySet::new();
    let (target, shim) = shim_pair(&mut set);
    TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);

    let holder = TypeBuilder::new(shim, "Contoso", "Extensions")
        .static_type()
        .attribute(marker("ExtensionsAttribute", Vec::new()))
        .build(&mut set);
    let container = TypeBuilder::new(shim, "Contoso", "WidgetExtensions")
        .nested_in(holder)
        .build(&mut set);
    MethodBuilder::new(
        container,
        EXTENSION_MARKER_METHOD,
        MethodSig::stat(
            TypeSig::Primitive(Primitive::Void),
            vec![widget_sig(&set, target)],
        ),
    )
    .special_name()
    .build(&mut set);
    let frob = MethodBuilder::new(
        container,
        "Frob",
        MethodSig::instance(TypeSig::Primitive(Primitive::Void), Vec::new()),
    )
    .build(&mut set);
    let implementation = MethodBuilder::new(
        holder,
        "Frob",
        MethodSig::stat(
            TypeSig::Primitive(Primitive::Void),
            vec![widget_sig(&set, target)],
        ),
    )
    .build(&mut set);

    let model = ShimModel::from_assembly(&set, shim)?;
    assert_eq!(model.all_types.len(), 1);
    assert_eq!(model.all_types[0].kind, ShimTypeKind::NativeExtension);
    assert_eq!(model.all_types[0].target.full_name(), "Contoso.Widget");

    let key = MemberKey::of_member(&set, MemberId::Method(frob));
    assert_eq!(model.extension_implementations.get(&key), Some(&implementation));
    Ok(())
}

#[test]
fn test_missing_extension_implementation_is_rejected() {
    let mut set = AssemblySet::new();
    let (target, shim) = shim_pair(&mut set);
    TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);

    let holder = TypeBuilder::new(shim, "Contoso", "Extensions")
        .static_type()
        .attribute(marker("ExtensionsAttribute", Vec::new()))
        .build(&mut set);
    let container = TypeBuilder::new(shim, "Contoso", "WidgetExtensions")
        .nested_in(holder)
        .build(&mut set);
    MethodBuilder::new(
        container,
        EXTENSION_MARKER_METHOD,
        MethodSig::stat(
            TypeSig::Primitive(Primitive::Void),
            vec![widget_sig(&set, target)],
        ),
    )
    .special_name()
    .build(&mut set);
    MethodBuilder::new(
        container,
        "Frob",
        MethodSig::instance(TypeSig::Primitive(Primitive::Void), Vec::new()),
    )
    .build(&mut set);

    let err = ShimModel::from_assembly(&set, shim).unwrap_err();
    assert!(matches!(err, Error::ExtensionImplementationNotFound(_)), "{err}");
}

#[test]
fn test_missing_shim_marker_is_rejected() {
    let mut set = AssemblySet::new();
    let shim = AssemblyBuilder::new("Contoso.Core.Shims", Version::new(1, 0, 0, 0)).build(&mut set);

    let err = ShimModel::from_assembly(&set, shim).unwrap_err();
    assert!(matches!(err, Error::MissingShimMarker), "{err}");
}

#[test]
fn test_duplicate_shim_marker_is_rejected() {
    let mut set = AssemblySet::new();
    let shim = AssemblyBuilder::new("Contoso.Core.Shims", Version::new(1, 0, 0, 0))
        .attribute(marker(
            "ShimAttribute",
            vec![AttrValue::String("Contoso.Core".into())],
        ))
        .attribute(marker(
            "ShimAttribute",
            vec![AttrValue::String("Contoso.Core".into())],
        ))
        .build(&mut set);

    let err = ShimModel::from_assembly(&set, shim).unwrap_err();
    assert!(matches!(err, Error::DuplicateShimMarker), "{err}");
}

#[test]
fn test_new_type_colliding_with_visible_target_is_rejected() {
    let mut set = AssemblySet::new();
    let (target, shim) = shim_pair(&mut set);
    TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);
    TypeBuilder::new(shim, "Contoso", "Widget").build(&mut set);

    let err = ShimModel::from_assembly(&set, shim).unwrap_err();
    assert!(matches!(err, Error::TypeCollision(_)), "{err}");
}

#[test]
fn test_invisible_non_new_shim_type_is_rejected() {
    let mut set = AssemblySet::new();
    let (target, shim) = shim_pair(&mut set);
    TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);
    TypeBuilder::new(shim, "Contoso", "Widget")
        .visibility(TypeVisibility::NotPublic)
        .attribute(marker(
            "ReplaceAttribute",
            vec![AttrValue::Type(widget_sig(&set, target))],
        ))
        .build(&mut set);

    let err = ShimModel::from_assembly(&set, shim).unwrap_err();
    assert!(matches!(err, Error::ShimTypeNotPublic(_)), "{err}");
}

/// An invisible `New` type is not part of any surface; it is skipped, not
/// rejected.
#[test]
fn test_invisible_new_type_is_skipped() -> Result<()> {
    let mut set = AssemblySet::new();
    let (_, shim) = shim_pair(&mut set);
    TypeBuilder::new(shim, "Contoso", "Hidden")
        .visibility(TypeVisibility::NotPublic)
        .build(&mut set);

    let model = ShimModel::from_assembly(&set, shim)?;
    assert!(model.all_types.is_empty());
    Ok(())
}

#[test]
fn test_cross_assembly_target_is_rejected() {
    let mut set = AssemblySet::new();
    let (_, shim) = shim_pair(&mut set);
    TypeBuilder::new(shim, "Contoso", "Widget")
        .attribute(marker(
            "ReplaceAttribute",
            vec![AttrValue::Type(TypeSig::Named(TypeRefPath::new(
                AssemblyName::unversioned("Elsewhere"),
                "Contoso",
                "Widget",
            )))],
        ))
        .build(&mut set);

    let err = ShimModel::from_assembly(&set, shim).unwrap_err();
    assert!(matches!(err, Error::ShimTargetOutsideAssembly(_, _)), "{err}");
}

#[test]
fn test_unresolved_replace_target_is_rejected() {
    let mut set = AssemblySet::new();
    let (target, shim) = shim_pair(&mut set);
    TypeBuilder::new(shim, "Contoso", "Widget")
        .attribute(marker(
            "ReplaceAttribute",
            vec![AttrValue::Type(widget_sig(&set, target))],
        ))
        .build(&mut set);

    let err = ShimModel::from_assembly(&set, shim).unwrap_err();
    assert!(matches!(err, Error::UnresolvedType(_)), "{err}");
}

#[test]
fn test_non_static_extension_holder_is_rejected() {
    let mut set = AssemblySet::new();
    let (target, shim) = shim_pair(&mut set);
    TypeBuilder::new(target, "Contoso", "Widget").build(&mut set);
    TypeBuilder::new(shim, "Contoso", "WidgetHelpers")
        .attribute(marker(
            "ExtensionAttribute",
            vec![AttrValue::Type(widget_sig(&set, target))],
        ))
        .build(&mut set);

    let err = ShimModel::from_assembly(&set, shim).unwrap_err();
    assert!(matches!(err, Error::ExtensionNotStatic(_)), "{err}");
}

#[test]
fn test_rename_directives_are_parsed() -> Result<()> {
    let mut set = AssemblySet::new();
    let target = AssemblyBuilder::new("Contoso.Core", Version::new(2, 0, 0, 0)).build(&mut set);
    let widget = widget_sig(&set, target);
    let shim = AssemblyBuilder::new("Contoso.Core.Shims", Version::new(1, 0, 0, 0))
        .attribute(marker(
            "ShimAttribute",
            vec![AttrValue::String("Contoso.Core".into())],
        ))
        .attribute(marker(
            "RenameAttribute",
            vec![
                AttrValue::String("Contoso.Legacy".into()),
                AttrValue::String("Contoso".into()),
            ],
        ))
        .attribute(marker(
            "RenameAttribute",
            vec![
                AttrValue::Type(widget.clone()),
                AttrValue::String("Frob".into()),
                AttrValue::String("Frobnicate".into()),
            ],
        ))
        .build(&mut set);

    let model = ShimModel::from_assembly(&set, shim)?;
    assert_eq!(
        model.renames,
        vec![
            RenameData::Namespace {
                namespace: "Contoso.Legacy".into(),
                new_namespace: "Contoso".into(),
            },
            RenameData::Member {
                target: widget,
                member: "Frob".into(),
                new_member: "Frobnicate".into(),
            },
        ]
    );
    Ok(())
}
