//! Shared helpers for unit tests: type factories and a call-counting [`MetadataSource`].

use std::{
    cell::Cell,
    sync::{Arc, Weak},
};

use crate::{
    metadata::{
        source::MetadataSource,
        tables::{
            CodedIndex, CustomAttribute, CustomAttributeRc, InterfaceImplRaw, TableId,
        },
        token::Token,
        typesystem::{CilType, CilTypeRc, TypeAttributes, TypeRegistry},
    },
    Error, Result,
};

/// Create a type with the given token and name
pub fn create_type(token: u32, name: &str, flags: TypeAttributes) -> CilTypeRc {
    Arc::new(CilType::new(Token::new(token), "Test", name, flags))
}

/// Create an `InterfaceImpl` row linking `TypeDef` `class` to `interface`
pub fn create_interface_impl_row(rid: u32, class: u32, interface: CodedIndex) -> InterfaceImplRaw {
    InterfaceImplRaw {
        rid,
        token: Token::from_parts(TableId::InterfaceImpl, rid),
        offset: 0,
        class,
        interface,
    }
}

/// Create a custom attribute attached to `parent`
pub fn create_custom_attribute(rid: u32, parent: Token) -> CustomAttributeRc {
    Arc::new(CustomAttribute {
        rid,
        token: Token::from_parts(TableId::CustomAttribute, rid),
        offset: 0,
        parent,
        constructor: Token::new(0x0A00_0001),
        value: vec![0x01, 0x00, 0x00, 0x00],
    })
}

/// Number of calls made into a [`MockSource`], per operation
#[derive(Default)]
pub struct CallCounts {
    pub read_interface_impl: Cell<u32>,
    pub resolve_type_def: Cell<u32>,
    pub resolve_type_def_or_ref: Cell<u32>,
    pub custom_attribute_rids: Cell<u32>,
    pub read_custom_attribute: Cell<u32>,
}

fn bump(counter: &Cell<u32>) {
    counter.set(counter.get() + 1);
}

/// An in-memory row source that records every call made into it
#[derive(Default)]
pub struct MockSource {
    pub interface_impls: Vec<InterfaceImplRaw>,
    pub custom_attributes: Vec<CustomAttributeRc>,
    pub types: TypeRegistry,
    pub calls: CallCounts,
}

impl MockSource {
    /// A source with one `InterfaceImpl` row (`TypeDef` 1 implements `TypeRef` 1) carrying two
    /// custom attributes
    pub fn single() -> Arc<MockSource> {
        let source = MockSource::default();
        source.types.insert(create_type(
            0x0200_0001,
            "Widget",
            TypeAttributes::PUBLIC,
        ));
        source.types.insert(create_type(
            0x0100_0001,
            "IWidget",
            TypeAttributes::PUBLIC | TypeAttributes::INTERFACE,
        ));

        let parent = Token::from_parts(TableId::InterfaceImpl, 1);
        Arc::new(MockSource {
            interface_impls: vec![create_interface_impl_row(
                1,
                1,
                CodedIndex::new(TableId::TypeRef, 1),
            )],
            custom_attributes: vec![
                create_custom_attribute(1, parent),
                create_custom_attribute(2, Token::from_parts(TableId::TypeDef, 1)),
                create_custom_attribute(3, parent),
            ],
            ..source
        })
    }

    /// A non-owning handle, as held by row-backed entities
    pub fn handle(self: &Arc<Self>) -> Weak<dyn MetadataSource> {
        let source: Arc<dyn MetadataSource> = self.clone();
        Arc::downgrade(&source)
    }

    fn lookup(&self, token: Token) -> Result<Option<CilTypeRc>> {
        match self.types.get(&token) {
            Some(found) => Ok(Some(found)),
            None => Err(Error::TypeNotFound(token)),
        }
    }
}

impl MetadataSource for MockSource {
    fn row_count(&self, table: TableId) -> u32 {
        match table {
            TableId::InterfaceImpl => self.interface_impls.len() as u32,
            TableId::CustomAttribute => self.custom_attributes.len() as u32,
            _ => 0,
        }
    }

    fn read_interface_impl(&self, rid: u32) -> Result<InterfaceImplRaw> {
        bump(&self.calls.read_interface_impl);
        self.interface_impls
            .iter()
            .find(|row| row.rid == rid)
            .cloned()
            .ok_or(Error::InvalidRowId {
                table: TableId::InterfaceImpl,
                rid,
            })
    }

    fn resolve_type_def(&self, index: u32) -> Result<Option<CilTypeRc>> {
        bump(&self.calls.resolve_type_def);
        if index == 0 {
            return Ok(None);
        }
        self.lookup(Token::from_parts(TableId::TypeDef, index))
    }

    fn resolve_type_def_or_ref(&self, index: &CodedIndex) -> Result<Option<CilTypeRc>> {
        bump(&self.calls.resolve_type_def_or_ref);
        if index.is_null() {
            return Ok(None);
        }
        self.lookup(index.token)
    }

    fn custom_attribute_rids(&self, parent: Token) -> Result<Vec<u32>> {
        bump(&self.calls.custom_attribute_rids);
        Ok(self
            .custom_attributes
            .iter()
            .filter(|attribute| attribute.parent == parent)
            .map(|attribute| attribute.rid)
            .collect())
    }

    fn read_custom_attribute(&self, rid: u32) -> Result<CustomAttributeRc> {
        bump(&self.calls.read_custom_attribute);
        self.custom_attributes
            .iter()
            .find(|attribute| attribute.rid == rid)
            .cloned()
            .ok_or(Error::InvalidRowId {
                table: TableId::CustomAttribute,
                rid,
            })
    }
}
