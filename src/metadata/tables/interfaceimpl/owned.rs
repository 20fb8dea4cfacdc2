use std::{
    cell::OnceCell,
    fmt,
    rc::Rc,
    sync::{Arc, Weak},
};

use crate::{
    metadata::{
        deferred::{Deferred, DeferredState},
        source::MetadataSource,
        tables::{CodedIndexType, CustomAttributeList, InterfaceImplRaw, TableId, MAX_ROW},
        token::Token,
        typesystem::CilTypeRc,
        validation::ValidationConfig,
    },
    Error, Result,
};

/// Position of `InterfaceImpl` in the `HasCustomAttribute` coded index
pub const HAS_CUSTOM_ATTRIBUTE_TAG: u32 = 5;

/// An `InterfaceImpl` built in memory, with plain mutable fields and no row source
#[derive(Debug, Default)]
pub struct UserInterfaceImpl {
    /// `RowID`, bookkeeping only
    pub rid: u32,
    /// The class that implements the interface
    pub class: Option<CilTypeRc>,
    /// The implemented interface
    pub interface: Option<CilTypeRc>,
    /// Custom attributes applied to this interface implementation
    pub custom_attributes: CustomAttributeList,
}

impl UserInterfaceImpl {
    /// Update the bookkeeping row id
    pub fn set_rid(&mut self, rid: u32) {
        self.rid = rid;
    }
}

// Shared by the entity and the closures of its deferred fields. The raw row is fetched at
// most once, however many fields are resolved.
struct RowHandle {
    owner: Weak<dyn MetadataSource>,
    rid: u32,
    raw: OnceCell<InterfaceImplRaw>,
}

impl RowHandle {
    fn source(&self) -> Result<Arc<dyn MetadataSource>> {
        self.owner.upgrade().ok_or(Error::NullOwner)
    }

    fn token(&self) -> Token {
        Token::from_parts(TableId::InterfaceImpl, self.rid)
    }

    fn raw(&self) -> Result<&InterfaceImplRaw> {
        if let Some(raw) = self.raw.get() {
            return Ok(raw);
        }

        let raw = self.source()?.read_interface_impl(self.rid)?;
        log::trace!("Fetched raw InterfaceImpl row {}", self.rid);
        Ok(self.raw.get_or_init(|| raw))
    }
}

/// An `InterfaceImpl` backed by a row of the owning module's `InterfaceImpl` table.
///
/// `class`, `interface` and the custom attribute list are deferred: they are resolved through
/// the owning [`MetadataSource`] on first read and can be overwritten at any time. The owner is
/// held through a [`Weak`] handle; once it is dropped, unresolved fields fail with
/// [`Error::NullOwner`].
pub struct RowBackedInterfaceImpl {
    handle: Rc<RowHandle>,
    class: Deferred<Option<CilTypeRc>>,
    interface: Deferred<Option<CilTypeRc>>,
    custom_attributes: Deferred<CustomAttributeList>,
}

impl RowBackedInterfaceImpl {
    /// Bind row `rid` of the `InterfaceImpl` table of `owner`.
    ///
    /// Nothing is read from the row at this point.
    ///
    /// # Errors
    /// Returns [`Error::NullOwner`] if `owner` is not alive, and [`Error::InvalidRowId`] if
    /// `config` asks for row id validation and `rid` is not a row of the table.
    pub fn new(
        owner: Weak<dyn MetadataSource>,
        rid: u32,
        config: &ValidationConfig,
    ) -> Result<Self> {
        let source = owner.upgrade().ok_or(Error::NullOwner)?;
        if config.should_validate_rids() && !source.is_valid_rid(TableId::InterfaceImpl, rid) {
            return Err(Error::InvalidRowId {
                table: TableId::InterfaceImpl,
                rid,
            });
        }

        let handle = Rc::new(RowHandle {
            owner,
            rid,
            raw: OnceCell::new(),
        });

        let class = {
            let handle = handle.clone();
            Deferred::lazy(move || {
                let index = handle.raw()?.class;
                log::trace!("Resolving class of {} - TypeDef {}", handle.token(), index);
                handle.source()?.resolve_type_def(index)
            })
        };

        let interface = {
            let handle = handle.clone();
            Deferred::lazy(move || {
                let index = handle.raw()?.interface;
                log::trace!("Resolving interface of {} - {}", handle.token(), index.token);
                handle.source()?.resolve_type_def_or_ref(&index)
            })
        };

        let custom_attributes = {
            let handle = handle.clone();
            Deferred::lazy(move || {
                let token = handle.token();
                let rids = handle.source()?.custom_attribute_rids(token)?;
                log::debug!("{} has {} custom attributes", token, rids.len());

                let owner = handle.owner.clone();
                Ok(CustomAttributeList::new_lazy(rids, move |rid| {
                    owner
                        .upgrade()
                        .ok_or(Error::NullOwner)?
                        .read_custom_attribute(rid)
                }))
            })
        };

        Ok(RowBackedInterfaceImpl {
            handle,
            class,
            interface,
            custom_attributes,
        })
    }

    /// `RowID`
    #[must_use]
    pub fn rid(&self) -> u32 {
        self.handle.rid
    }

    /// The implementing class, resolved on first read.
    ///
    /// # Errors
    /// Returns the (cached) resolution error.
    pub fn class(&mut self) -> Result<Option<&CilTypeRc>> {
        Ok(self.class.read()?.as_ref())
    }

    /// Overwrite the implementing class; the row is not consulted for it anymore
    pub fn set_class(&mut self, class: Option<CilTypeRc>) {
        self.class.write(class);
    }

    /// The implemented interface, resolved on first read.
    ///
    /// # Errors
    /// Returns the (cached) resolution error.
    pub fn interface(&mut self) -> Result<Option<&CilTypeRc>> {
        Ok(self.interface.read()?.as_ref())
    }

    /// Overwrite the implemented interface; the row is not consulted for it anymore
    pub fn set_interface(&mut self, interface: Option<CilTypeRc>) {
        self.interface.write(interface);
    }

    /// The custom attributes of this row.
    ///
    /// The first call fetches the attribute row ids from the owner; every later call returns
    /// the same list, including any changes made to it.
    ///
    /// # Errors
    /// Returns the (cached) error of the row id fetch.
    pub fn custom_attributes(&mut self) -> Result<&mut CustomAttributeList> {
        self.custom_attributes.read_mut()
    }

    /// State of the deferred `class` field
    #[must_use]
    pub fn class_state(&self) -> DeferredState {
        self.class.state()
    }

    /// State of the deferred `interface` field
    #[must_use]
    pub fn interface_state(&self) -> DeferredState {
        self.interface.state()
    }

    /// Returns `true` once the raw row has been fetched from the owner
    #[must_use]
    pub fn is_row_loaded(&self) -> bool {
        self.handle.raw.get().is_some()
    }
}

impl fmt::Debug for RowBackedInterfaceImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowBackedInterfaceImpl")
            .field("rid", &self.handle.rid)
            .field("class", &self.class)
            .field("interface", &self.interface)
            .field("custom_attributes", &self.custom_attributes.state())
            .finish()
    }
}

/// An interface implementation: `class` implements `interface`.
///
/// Entities built in memory and entities loaded from a module share this one type, so callers
/// never need to know where an instance came from. Field access on the row-backed variant
/// may resolve data and therefore returns a [`Result`]; the user-authored variant never fails.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use dotbind::metadata::{
///     tables::InterfaceImpl,
///     token::Token,
///     typesystem::{CilType, TypeAttributes},
/// };
///
/// let class = Arc::new(CilType::new(Token::new(0x02000002), "Demo", "Widget", TypeAttributes::PUBLIC));
/// let mut entry = InterfaceImpl::new();
/// assert!(entry.class()?.is_none());
///
/// entry.set_class(Some(class.clone()));
/// assert_eq!(entry.class()?.unwrap().name, "Widget");
/// assert!(entry.custom_attributes()?.is_empty());
/// # Ok::<(), dotbind::Error>(())
/// ```
#[derive(Debug)]
pub enum InterfaceImpl {
    /// Built in memory
    User(UserInterfaceImpl),
    /// Loaded from a metadata table
    RowBacked(RowBackedInterfaceImpl),
}

impl Default for InterfaceImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl InterfaceImpl {
    /// Create a user-authored entry with class and interface unset
    #[must_use]
    pub fn new() -> Self {
        InterfaceImpl::User(UserInterfaceImpl::default())
    }

    /// Create a user-authored entry linking `class` to `interface`
    #[must_use]
    pub fn with_types(class: CilTypeRc, interface: CilTypeRc) -> Self {
        InterfaceImpl::User(UserInterfaceImpl {
            class: Some(class),
            interface: Some(interface),
            ..UserInterfaceImpl::default()
        })
    }

    /// Create a row-backed entry for row `rid` of the `InterfaceImpl` table of `owner`.
    ///
    /// # Errors
    /// See [`RowBackedInterfaceImpl::new`].
    pub fn from_row(
        owner: Weak<dyn MetadataSource>,
        rid: u32,
        config: &ValidationConfig,
    ) -> Result<Self> {
        Ok(InterfaceImpl::RowBacked(RowBackedInterfaceImpl::new(
            owner, rid, config,
        )?))
    }

    /// Returns `true` if this entry is bound to a table row
    #[must_use]
    pub fn is_row_backed(&self) -> bool {
        matches!(self, InterfaceImpl::RowBacked(_))
    }

    /// `RowID`
    #[must_use]
    pub fn rid(&self) -> u32 {
        match self {
            InterfaceImpl::User(user) => user.rid,
            InterfaceImpl::RowBacked(row) => row.rid(),
        }
    }

    /// Token
    #[must_use]
    pub fn token(&self) -> Token {
        Token::from_parts(TableId::InterfaceImpl, self.rid())
    }

    /// Tag of this entity kind within the `HasCustomAttribute` coded index
    #[must_use]
    pub fn has_custom_attribute_tag(&self) -> u32 {
        HAS_CUSTOM_ATTRIBUTE_TAG
    }

    /// The `HasCustomAttribute` coded value that custom attribute rows use to point at this entry.
    ///
    /// Returns `None` if the row id is beyond the 24 bit token row range, as the coded value
    /// could not address it.
    #[must_use]
    pub fn has_custom_attribute_index(&self) -> Option<u32> {
        let rid = self.rid();
        if rid > MAX_ROW {
            return None;
        }

        Some((rid << CodedIndexType::HasCustomAttribute.tag_bits()) | HAS_CUSTOM_ATTRIBUTE_TAG)
    }

    /// The implementing class.
    ///
    /// # Errors
    /// Row-backed entries return the (cached) resolution error.
    pub fn class(&mut self) -> Result<Option<&CilTypeRc>> {
        match self {
            InterfaceImpl::User(user) => Ok(user.class.as_ref()),
            InterfaceImpl::RowBacked(row) => row.class(),
        }
    }

    /// Set the implementing class
    pub fn set_class(&mut self, class: Option<CilTypeRc>) {
        match self {
            InterfaceImpl::User(user) => user.class = class,
            InterfaceImpl::RowBacked(row) => row.set_class(class),
        }
    }

    /// The implemented interface.
    ///
    /// # Errors
    /// Row-backed entries return the (cached) resolution error.
    pub fn interface(&mut self) -> Result<Option<&CilTypeRc>> {
        match self {
            InterfaceImpl::User(user) => Ok(user.interface.as_ref()),
            InterfaceImpl::RowBacked(row) => row.interface(),
        }
    }

    /// Set the implemented interface
    pub fn set_interface(&mut self, interface: Option<CilTypeRc>) {
        match self {
            InterfaceImpl::User(user) => user.interface = interface,
            InterfaceImpl::RowBacked(row) => row.set_interface(interface),
        }
    }

    /// The custom attributes of this entry. The returned list is mutable in place.
    ///
    /// # Errors
    /// Row-backed entries return the (cached) error of the attribute row id fetch.
    pub fn custom_attributes(&mut self) -> Result<&mut CustomAttributeList> {
        match self {
            InterfaceImpl::User(user) => Ok(&mut user.custom_attributes),
            InterfaceImpl::RowBacked(row) => row.custom_attributes(),
        }
    }

    /// The user-authored variant, if this is one
    #[must_use]
    pub fn as_user_mut(&mut self) -> Option<&mut UserInterfaceImpl> {
        match self {
            InterfaceImpl::User(user) => Some(user),
            InterfaceImpl::RowBacked(_) => None,
        }
    }

    /// The row-backed variant, if this is one
    #[must_use]
    pub fn as_row_backed(&self) -> Option<&RowBackedInterfaceImpl> {
        match self {
            InterfaceImpl::User(_) => None,
            InterfaceImpl::RowBacked(row) => Some(row),
        }
    }
}
