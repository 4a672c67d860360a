use serde::{Deserialize, Serialize};

macro_rules! sync_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            pub const fn value(&self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

sync_id!(
    /// Identity of a node (or transient fragment) on the data side, mirrored
    /// 1:1 into the view-side registry.
    NodeId
);
sync_id!(
    /// Correlates a request with its asynchronous reply.
    CallbackId
);
sync_id!(
    /// Numbers one dispatched event across all of its notifications.
    EventId
);
sync_id!(
    /// Sequential handle of an appended style sheet path.
    StyleSheetId
);
sync_id!(
    /// Handle of a style scope as known by the side that issued it.
    StyleScopeId
);
sync_id!(
    /// Opaque view-issued handle of a dynamic slot placeholder.
    SlotId
);
sync_id!(TraceId);

/// Which executor a piece of code runs on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Data,
    View,
}

impl Side {
    pub fn invert(self) -> Self {
        match self {
            Side::Data => Side::View,
            Side::View => Side::Data,
        }
    }
}
