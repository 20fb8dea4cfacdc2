//! Interface implementations bound to crafted metadata tables, and to a counting row source.

use std::{
    cell::Cell,
    sync::{Arc, Weak},
};

use dotbind::prelude::*;
use dotbind::metadata::tables::InterfaceImplRaw;

/// Row source that resolves every index to a fresh type and counts how often it is asked
#[derive(Default)]
struct CountingSource {
    rows: u32,
    row_reads: Cell<u32>,
    resolutions: Cell<u32>,
    attribute_lookups: Cell<u32>,
    fail_types: bool,
}

impl CountingSource {
    fn with_rows(rows: u32) -> Arc<Self> {
        Arc::new(CountingSource {
            rows,
            ..CountingSource::default()
        })
    }

    fn resolve(&self, token: Token) -> Result<Option<CilTypeRc>> {
        self.resolutions.set(self.resolutions.get() + 1);
        if self.fail_types {
            return Err(Error::Resolution {
                token,
                message: "unresolvable".to_string(),
            });
        }

        // A new instance per call; callers must see the first one forever
        Ok(Some(Arc::new(CilType::new(
            token,
            "Generated",
            format!("T{}", self.resolutions.get()),
            TypeAttributes::PUBLIC,
        ))))
    }
}

impl MetadataSource for CountingSource {
    fn row_count(&self, table: TableId) -> u32 {
        match table {
            TableId::InterfaceImpl => self.rows,
            _ => 0,
        }
    }

    fn read_interface_impl(&self, rid: u32) -> Result<InterfaceImplRaw> {
        self.row_reads.set(self.row_reads.get() + 1);
        Ok(InterfaceImplRaw {
            rid,
            token: Token::from_parts(TableId::InterfaceImpl, rid),
            offset: 0,
            class: rid,
            interface: CodedIndex::new(TableId::TypeRef, rid),
        })
    }

    fn resolve_type_def(&self, index: u32) -> Result<Option<CilTypeRc>> {
        self.resolve(Token::from_parts(TableId::TypeDef, index))
    }

    fn resolve_type_def_or_ref(&self, index: &CodedIndex) -> Result<Option<CilTypeRc>> {
        self.resolve(index.token)
    }

    fn custom_attribute_rids(&self, _parent: Token) -> Result<Vec<u32>> {
        self.attribute_lookups.set(self.attribute_lookups.get() + 1);
        Ok(vec![1, 2, 3])
    }

    fn read_custom_attribute(&self, rid: u32) -> Result<CustomAttributeRc> {
        Ok(Arc::new(CustomAttribute {
            rid,
            token: Token::from_parts(TableId::CustomAttribute, rid),
            offset: 0,
            parent: Token::new(0x0900_0001),
            constructor: Token::new(0x0A00_0001),
            value: Vec::new(),
        }))
    }
}

fn handle(source: &Arc<CountingSource>) -> Weak<dyn MetadataSource> {
    let source: Arc<dyn MetadataSource> = source.clone();
    Arc::downgrade(&source)
}

#[test]
fn single_invocation_law() {
    let source = CountingSource::with_rows(3);
    let mut entry = InterfaceImpl::from_row(handle(&source), 2, &ValidationConfig::strict()).unwrap();

    let first = entry.class().unwrap().unwrap().clone();
    for _ in 0..100 {
        assert!(Arc::ptr_eq(entry.class().unwrap().unwrap(), &first));
    }
    entry.interface().unwrap();

    assert_eq!(source.row_reads.get(), 1);
    assert_eq!(source.resolutions.get(), 2);
    assert_eq!(first.token, Token::new(0x0200_0002));
}

#[test]
fn override_law() {
    let source = CountingSource::with_rows(1);
    let mut entry = InterfaceImpl::from_row(handle(&source), 1, &ValidationConfig::strict()).unwrap();

    let replacement = Arc::new(CilType::new(
        Token::new(0x0200_0042),
        "Edited",
        "Replacement",
        TypeAttributes::INTERFACE,
    ));
    entry.set_interface(Some(replacement.clone()));

    for _ in 0..10 {
        assert!(Arc::ptr_eq(entry.interface().unwrap().unwrap(), &replacement));
    }
    assert_eq!(source.resolutions.get(), 0);
    assert_eq!(source.row_reads.get(), 0);

    // Resolved first, then overridden
    entry.class().unwrap();
    entry.set_class(None);
    assert!(entry.class().unwrap().is_none());
    assert_eq!(source.resolutions.get(), 1);
}

#[test]
fn failed_resolution_is_replayed() {
    let source = Arc::new(CountingSource {
        rows: 1,
        fail_types: true,
        ..CountingSource::default()
    });
    let mut entry = InterfaceImpl::from_row(handle(&source), 1, &ValidationConfig::strict()).unwrap();

    let first = entry.class().unwrap_err();
    let second = entry.class().unwrap_err();
    assert_eq!(first, second);
    assert!(matches!(first, Error::Resolution { .. }));
    assert_eq!(source.resolutions.get(), 1);

    let fallback = Arc::new(CilType::new(Token::new(0x0200_0001), "", "Fallback", TypeAttributes::empty()));
    entry.set_class(Some(fallback));
    assert_eq!(entry.class().unwrap().unwrap().name, "Fallback");
    assert_eq!(source.resolutions.get(), 1);
}

#[test]
fn invalid_row_ids() {
    let source = CountingSource::with_rows(4);
    for rid in [0, 5, 0x00FF_FFFF] {
        let error = InterfaceImpl::from_row(handle(&source), rid, &ValidationConfig::strict())
            .unwrap_err();
        assert_eq!(
            error,
            Error::InvalidRowId {
                table: TableId::InterfaceImpl,
                rid
            }
        );
    }
    assert_eq!(source.row_reads.get(), 0);
}

#[test]
fn null_owner() {
    let orphan: Weak<dyn MetadataSource> = Weak::<CountingSource>::new();
    let error = InterfaceImpl::from_row(orphan, 1, &ValidationConfig::fast()).unwrap_err();
    assert_eq!(error, Error::NullOwner);
}

#[test]
fn custom_attribute_identity() {
    let source = CountingSource::with_rows(1);
    let mut entry = InterfaceImpl::from_row(handle(&source), 1, &ValidationConfig::strict()).unwrap();

    let first: *const CustomAttributeList = entry.custom_attributes().unwrap();
    for _ in 0..10 {
        let again: *const CustomAttributeList = entry.custom_attributes().unwrap();
        assert!(std::ptr::eq(first, again));
    }
    assert_eq!(source.attribute_lookups.get(), 1);

    let attributes = entry.custom_attributes().unwrap();
    assert_eq!(attributes.len(), 3);
    assert!(!attributes.is_loaded(0));

    let added = Arc::new(CustomAttribute {
        rid: 0,
        token: Token::new(0),
        offset: 0,
        parent: Token::new(0x0900_0001),
        constructor: Token::new(0x0600_0010),
        value: vec![0x01, 0x00],
    });
    attributes.push(added.clone());
    attributes.remove(0).unwrap();

    let all = entry.custom_attributes().unwrap().to_vec().unwrap();
    assert_eq!(all.iter().map(|attribute| attribute.rid).collect::<Vec<_>>(), [2, 3, 0]);
    assert!(Arc::ptr_eq(&all[2], &added));
    assert_eq!(source.attribute_lookups.get(), 1);
}

#[test]
fn user_variant_never_resolves() {
    let mut entry = InterfaceImpl::new();
    assert!(entry.class().unwrap().is_none());
    assert!(entry.interface().unwrap().is_none());
    assert!(entry.custom_attributes().unwrap().is_empty());
    assert!(!entry.is_row_backed());
    assert!(entry.as_row_backed().is_none());
}

#[rustfmt::skip]
#[test]
fn crafted_tables() {
    let info = Arc::new(TableInfo::new(
        &[
            (TableId::InterfaceImpl, 3),
            (TableId::CustomAttribute, 2),
            (TableId::TypeDef, 2),
            (TableId::TypeRef, 2),
        ],
        false,
    ));

    let interface_impls = vec![
        0x01, 0x00, 0x05, 0x00, // TypeDef 1 : TypeRef 1
        0x01, 0x00, 0x09, 0x00, // TypeDef 1 : TypeRef 2
        0x02, 0x00, 0x06, 0x00, // TypeDef 2 : TypeSpec 1 (unknown)
    ];
    let custom_attributes = vec![
        0x45, 0x00, 0x0B, 0x00, 0x01, 0x00, // InterfaceImpl 2, MemberRef 1, blob 1
        0x45, 0x00, 0x0B, 0x00, 0x00, 0x00, // InterfaceImpl 2, MemberRef 1
    ];
    let blob = vec![0x00, 0x04, 0x01, 0x00, 0x00, 0x00];

    let types = TypeRegistry::new();
    types.insert(Arc::new(CilType::new(Token::new(0x0200_0001), "App", "Service", TypeAttributes::PUBLIC)));
    types.insert(Arc::new(CilType::new(Token::new(0x0200_0002), "App", "Worker", TypeAttributes::PUBLIC)));
    types.insert(Arc::new(CilType::new(Token::new(0x0100_0001), "System", "IDisposable", TypeAttributes::INTERFACE)));
    types.insert(Arc::new(CilType::new(Token::new(0x0100_0002), "System", "ICloneable", TypeAttributes::INTERFACE)));

    let module = Arc::new(ModuleTables::new(info, interface_impls, custom_attributes, blob, types).unwrap());
    let mut entries = module.interface_impls().unwrap();
    assert_eq!(entries.len(), 3);

    let names: Vec<String> = entries[..2]
        .iter_mut()
        .map(|entry| entry.interface().unwrap().unwrap().fullname())
        .collect();
    assert_eq!(names, ["System.IDisposable", "System.ICloneable"]);
    assert_eq!(entries[1].class().unwrap().unwrap().name, "Service");

    assert_eq!(
        entries[2].interface().unwrap_err(),
        Error::TypeNotFound(Token::new(0x1B00_0001))
    );
    assert_eq!(entries[2].class().unwrap().unwrap().name, "Worker");

    assert!(entries[0].custom_attributes().unwrap().is_empty());
    let attributes = entries[1].custom_attributes().unwrap();
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes.get(0).unwrap().unwrap().value, vec![0x01, 0x00, 0x00, 0x00]);
    assert_eq!(attributes.get(1).unwrap().unwrap().parent, entries_token(2));
}

fn entries_token(rid: u32) -> Token {
    Token::from_parts(TableId::InterfaceImpl, rid)
}
