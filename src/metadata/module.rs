//! In-memory row source for a single module.
//!
//! [`ModuleTables`] owns the raw bytes of the `InterfaceImpl` and `CustomAttribute` tables, the
//! `#Blob` heap, and the module's [`TypeRegistry`]. It implements [`MetadataSource`] on top of
//! them and hands out row-backed [`InterfaceImpl`] entities that point back at it through a
//! weak handle. The tables never hold on to the entities they create.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use dotbind::metadata::{
//!     module::ModuleTables,
//!     tables::{TableId, TableInfo},
//!     token::Token,
//!     typesystem::{CilType, TypeAttributes, TypeRegistry},
//! };
//!
//! let info = Arc::new(TableInfo::new(
//!     &[(TableId::InterfaceImpl, 1), (TableId::TypeDef, 1), (TableId::TypeRef, 1)],
//!     false,
//! ));
//! let types = TypeRegistry::new();
//! types.insert(Arc::new(CilType::new(Token::new(0x02000001), "Demo", "Widget", TypeAttributes::PUBLIC)));
//! types.insert(Arc::new(CilType::new(Token::new(0x01000001), "Demo", "IWidget", TypeAttributes::INTERFACE)));
//!
//! // class: TypeDef 1, interface: TypeRef 1
//! let module = Arc::new(ModuleTables::new(info, vec![0x01, 0x00, 0x05, 0x00], Vec::new(), vec![0x00], types)?);
//!
//! let mut entries = module.interface_impls()?;
//! assert_eq!(entries[0].class()?.unwrap().name, "Widget");
//! assert_eq!(entries[0].interface()?.unwrap().name, "IWidget");
//! # Ok::<(), dotbind::Error>(())
//! ```

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    metadata::{
        source::MetadataSource,
        streams::Blob,
        tables::{
            CodedIndex, CustomAttributeRaw, CustomAttributeRc, InterfaceImpl, InterfaceImplRaw,
            MetadataTable, TableId, TableInfoRef, MAX_ROW,
        },
        token::Token,
        typesystem::{CilTypeRc, TypeRegistry},
        validation::ValidationConfig,
    },
    Error, Result,
};

/// The tables, heap and types of one module.
pub struct ModuleTables {
    info: TableInfoRef,
    interface_impls: MetadataTable<InterfaceImplRaw>,
    custom_attributes: MetadataTable<CustomAttributeRaw>,
    attributes_by_parent: BTreeMap<Token, Vec<u32>>,
    blob: Vec<u8>,
    types: TypeRegistry,
    config: ValidationConfig,
}

impl ModuleTables {
    /// Create the row source from raw table bytes.
    ///
    /// Row counts are taken from `info`. The custom attribute table is scanned once to index
    /// attributes by their parent.
    ///
    /// ## Arguments
    /// * `info` - Row counts and index sizes of the module
    /// * `interface_impls` - Bytes of the `InterfaceImpl` table
    /// * `custom_attributes` - Bytes of the `CustomAttribute` table
    /// * `blob` - The `#Blob` heap, starting with its null entry
    /// * `types` - All types that `TypeDef`, `TypeRef` and `TypeSpec` indexes can resolve to
    ///
    /// # Errors
    /// Returns an error if a table is shorter than its row count implies, a custom attribute row
    /// is malformed, or the blob heap is invalid.
    pub fn new(
        info: TableInfoRef,
        interface_impls: Vec<u8>,
        custom_attributes: Vec<u8>,
        blob: Vec<u8>,
        types: TypeRegistry,
    ) -> Result<Self> {
        Blob::from(&blob)?;

        let interface_impls = MetadataTable::new(
            interface_impls,
            info.rows(TableId::InterfaceImpl),
            info.clone(),
        )?;
        let custom_attributes = MetadataTable::<CustomAttributeRaw>::new(
            custom_attributes,
            info.rows(TableId::CustomAttribute),
            info.clone(),
        )?;

        let mut attributes_by_parent: BTreeMap<Token, Vec<u32>> = BTreeMap::new();
        for row in &custom_attributes {
            let row = row?;
            attributes_by_parent
                .entry(row.parent.token)
                .or_default()
                .push(row.rid);
        }

        log::debug!(
            "Indexed {} custom attributes on {} parents, {} interface implementations",
            custom_attributes.row_count(),
            attributes_by_parent.len(),
            interface_impls.row_count()
        );

        Ok(ModuleTables {
            info,
            interface_impls,
            custom_attributes,
            attributes_by_parent,
            blob,
            types,
            config: ValidationConfig::default(),
        })
    }

    /// Use `config` for all entities created from now on
    #[must_use]
    pub fn with_validation(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    /// Row counts and index sizes of this module
    #[must_use]
    pub fn info(&self) -> &TableInfoRef {
        &self.info
    }

    /// The types of this module
    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Bind row `rid` of the `InterfaceImpl` table.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRowId`] if the row does not exist and validation is active.
    pub fn interface_impl(self: &Arc<Self>, rid: u32) -> Result<InterfaceImpl> {
        let owner: Arc<dyn MetadataSource> = self.clone();
        InterfaceImpl::from_row(Arc::downgrade(&owner), rid, &self.config)
    }

    /// Bind every row of the `InterfaceImpl` table, in table order.
    ///
    /// Only the entities are created; no row is read until a field is accessed.
    ///
    /// # Errors
    /// Returns the first construction error.
    pub fn interface_impls(self: &Arc<Self>) -> Result<Vec<InterfaceImpl>> {
        let owner: Arc<dyn MetadataSource> = self.clone();
        let weak = Arc::downgrade(&owner);

        (1..=self.interface_impls.row_count())
            .map(|rid| InterfaceImpl::from_row(weak.clone(), rid, &self.config))
            .collect()
    }

    fn lookup_type(&self, token: Token) -> Result<Option<CilTypeRc>> {
        match self.types.get(&token) {
            Some(found) => Ok(Some(found)),
            None => Err(Error::TypeNotFound(token)),
        }
    }
}

impl MetadataSource for ModuleTables {
    fn row_count(&self, table: TableId) -> u32 {
        match table {
            TableId::InterfaceImpl => self.interface_impls.row_count(),
            TableId::CustomAttribute => self.custom_attributes.row_count(),
            _ => self.info.rows(table),
        }
    }

    fn read_interface_impl(&self, rid: u32) -> Result<InterfaceImplRaw> {
        self.interface_impls.try_get(rid)
    }

    fn resolve_type_def(&self, index: u32) -> Result<Option<CilTypeRc>> {
        if index == 0 {
            return Ok(None);
        }

        let token = Token::from_parts(TableId::TypeDef, index);
        if index > MAX_ROW {
            return Err(Error::Resolution {
                token,
                message: format!("TypeDef index {index} does not fit into a token"),
            });
        }

        self.lookup_type(token)
    }

    fn resolve_type_def_or_ref(&self, index: &CodedIndex) -> Result<Option<CilTypeRc>> {
        if index.is_null() {
            return Ok(None);
        }

        if index.row > MAX_ROW {
            return Err(Error::Resolution {
                token: index.token,
                message: format!("{:?} row {} does not fit into a token", index.tag, index.row),
            });
        }

        match index.tag {
            TableId::TypeDef | TableId::TypeRef | TableId::TypeSpec => {
                self.lookup_type(index.token)
            }
            other => Err(Error::Resolution {
                token: index.token,
                message: format!("{other:?} is not a TypeDefOrRef target"),
            }),
        }
    }

    fn custom_attribute_rids(&self, parent: Token) -> Result<Vec<u32>> {
        Ok(self
            .attributes_by_parent
            .get(&parent)
            .cloned()
            .unwrap_or_default())
    }

    fn read_custom_attribute(&self, rid: u32) -> Result<CustomAttributeRc> {
        let raw = self.custom_attributes.try_get(rid)?;
        raw.to_owned(&Blob::from(&self.blob)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{tables::TableInfo, typesystem::TypeAttributes},
        test::create_type,
    };

    #[rustfmt::skip]
    fn fixture() -> Arc<ModuleTables> {
        let info = Arc::new(TableInfo::new(
            &[
                (TableId::InterfaceImpl, 2),
                (TableId::CustomAttribute, 3),
                (TableId::TypeDef, 3),
                (TableId::TypeRef, 1),
            ],
            false,
        ));

        let interface_impls = vec![
            0x01, 0x00, 0x05, 0x00, // TypeDef 1 : TypeRef 1
            0x02, 0x00, 0x0C, 0x00, // TypeDef 2 : TypeDef 3
        ];
        let custom_attributes = vec![
            0x25, 0x00, 0x0B, 0x00, 0x01, 0x00, // InterfaceImpl 1, MemberRef 1, blob 1
            0x23, 0x00, 0x0B, 0x00, 0x00, 0x00, // TypeDef 1
            0x25, 0x00, 0x0A, 0x00, 0x00, 0x00, // InterfaceImpl 1, MethodDef 1
        ];
        let blob = vec![0x00, 0x02, 0x01, 0x00];

        let types = TypeRegistry::new();
        types.insert(create_type(0x0200_0001, "Widget", TypeAttributes::PUBLIC));
        types.insert(create_type(0x0200_0002, "Gadget", TypeAttributes::PUBLIC));
        types.insert(create_type(0x0200_0003, "IGadget", TypeAttributes::INTERFACE));
        types.insert(create_type(0x0100_0001, "IWidget", TypeAttributes::INTERFACE));

        Arc::new(ModuleTables::new(info, interface_impls, custom_attributes, blob, types).unwrap())
    }

    #[test]
    fn enumerate_and_resolve() {
        let module = fixture();
        let mut entries = module.interface_impls().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(InterfaceImpl::is_row_backed));

        assert_eq!(entries[0].class().unwrap().unwrap().name, "Widget");
        assert_eq!(entries[0].interface().unwrap().unwrap().name, "IWidget");
        assert_eq!(entries[1].class().unwrap().unwrap().name, "Gadget");
        assert_eq!(entries[1].interface().unwrap().unwrap().name, "IGadget");
        assert_eq!(entries[1].token(), Token::new(0x0900_0002));
    }

    #[test]
    fn custom_attributes_by_parent() {
        let module = fixture();
        assert_eq!(
            module.custom_attribute_rids(Token::new(0x0900_0001)).unwrap(),
            vec![1, 3]
        );
        assert_eq!(
            module.custom_attribute_rids(Token::new(0x0200_0001)).unwrap(),
            vec![2]
        );
        assert!(module
            .custom_attribute_rids(Token::new(0x0900_0002))
            .unwrap()
            .is_empty());

        let mut entry = module.interface_impl(1).unwrap();
        let attributes = entry.custom_attributes().unwrap().to_vec().unwrap();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].constructor, Token::new(0x0A00_0001));
        assert_eq!(attributes[0].value, vec![0x01, 0x00]);
        assert_eq!(attributes[1].constructor, Token::new(0x0600_0001));
        assert!(attributes[1].value.is_empty());
    }

    #[test]
    fn invalid_rows() {
        let module = fixture();
        assert_eq!(
            module.interface_impl(3).unwrap_err(),
            Error::InvalidRowId {
                table: TableId::InterfaceImpl,
                rid: 3
            }
        );
        assert!(module.read_custom_attribute(4).is_err());
        assert!(module.is_valid_rid(TableId::CustomAttribute, 3));
        assert!(!module.is_valid_rid(TableId::CustomAttribute, 0));
    }

    #[test]
    fn resolver_edge_cases() {
        let module = fixture();
        assert!(module.resolve_type_def(0).unwrap().is_none());
        assert_eq!(
            module.resolve_type_def(9).unwrap_err(),
            Error::TypeNotFound(Token::new(0x0200_0009))
        );
        assert!(matches!(
            module.resolve_type_def(0x0100_0000),
            Err(Error::Resolution { .. })
        ));

        assert!(module
            .resolve_type_def_or_ref(&CodedIndex::new(TableId::TypeRef, 0))
            .unwrap()
            .is_none());
        assert!(matches!(
            module.resolve_type_def_or_ref(&CodedIndex::new(TableId::MethodDef, 1)),
            Err(Error::Resolution { .. })
        ));

        // The token keeps only 24 row bits and would address TypeDef 1
        let wide = CodedIndex {
            tag: TableId::TypeDef,
            row: 0x0100_0001,
            token: Token::from_parts(TableId::TypeDef, 0x0100_0001),
        };
        assert!(matches!(
            module.resolve_type_def_or_ref(&wide),
            Err(Error::Resolution { .. })
        ));
    }

    #[test]
    fn entities_outlive_nothing() {
        let module = fixture();
        let mut entry = module.interface_impl(2).unwrap();
        drop(module);

        assert_eq!(entry.class().unwrap_err(), Error::NullOwner);
    }

    #[test]
    fn fast_validation_in_debug() {
        let module = Arc::new(
            Arc::try_unwrap(fixture())
                .ok()
                .unwrap()
                .with_validation(ValidationConfig::fast()),
        );

        let result = module.interface_impl(0);
        assert_eq!(result.is_err(), cfg!(debug_assertions));
    }

    #[test]
    fn truncated_table() {
        let info = Arc::new(TableInfo::new(
            &[(TableId::InterfaceImpl, 2)],
            false,
        ));
        let result = ModuleTables::new(
            info,
            vec![0x01, 0x00, 0x05, 0x00],
            Vec::new(),
            vec![0x00],
            TypeRegistry::new(),
        );
        assert!(matches!(result, Err(Error::OutOfBounds)));
    }
}
