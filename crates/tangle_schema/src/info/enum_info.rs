// -----------------------------------------------------------------------------
// EnumInfo

/// Declaration-time information for an enumeration: its name and the member
/// names in declaration order.
///
/// Descriptors are compared by address, so each enumeration should own
/// exactly one `static` instance:
///
/// ```
/// use tangle_schema::info::EnumInfo;
///
/// static COLOR: EnumInfo = EnumInfo::new("Color", &["Red", "Green", "Blue"]);
///
/// assert!(COLOR.contains("Red"));
/// assert_eq!(COLOR.index_of("Blue"), Some(2));
/// ```
#[derive(Debug)]
pub struct EnumInfo {
    name: &'static str,
    members: &'static [&'static str],
}

impl EnumInfo {
    /// Creates a new [`EnumInfo`] with the given member names.
    #[inline]
    pub const fn new(name: &'static str, members: &'static [&'static str]) -> Self {
        Self { name, members }
    }

    /// The enumeration's name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Member names in declaration order.
    #[inline]
    pub const fn members(&self) -> &'static [&'static str] {
        self.members
    }

    /// Whether a member with the given name is declared.
    pub fn contains(&self, member: &str) -> bool {
        self.member(member).is_some()
    }

    /// The canonical `&'static str` for a member name, if declared.
    pub fn member(&self, member: &str) -> Option<&'static str> {
        self.members.iter().copied().find(|m| *m == member)
    }

    /// The declaration index of a member name, if declared.
    pub fn index_of(&self, member: &str) -> Option<usize> {
        self.members.iter().position(|m| *m == member)
    }
}
