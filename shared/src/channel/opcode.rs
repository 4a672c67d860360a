use crate::{error::ProtocolError, types::Side};

macro_rules! channel_event_types {
    ($($name:ident => $sender:ident,)*) => {
        /// Every message kind of the channel, numbered from 1 in declaration
        /// order. Each kind is emitted by exactly one side.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum ChannelEventType {
            $($name,)*
        }

        impl ChannelEventType {
            const ALL: &'static [ChannelEventType] = &[$(ChannelEventType::$name,)*];

            /// The only side allowed to emit this opcode
            pub fn sender(&self) -> Side {
                match self {
                    $(ChannelEventType::$name => Side::$sender,)*
                }
            }
        }
    };
}

channel_event_types! {
    Create => Data,
    CreateCallback => View,
    Destroy => Data,

    OnWindowResize => Data,
    OnWindowResizeCallback => View,
    OnThemeChange => Data,
    OnThemeChangeCallback => View,
    Render => Data,
    RenderCallback => View,
    CreateMediaQueryObserver => Data,
    MediaQueryObserverCallback => View,
    CreateIntersectionObserver => Data,
    IntersectionObserverCallback => View,
    DisconnectObserver => Data,

    CreateElement => Data,
    CreateComponent => Data,
    CreateTextNode => Data,
    CreateVirtualNode => Data,
    CreateFragment => Data,
    Release => Data,

    AppendChild => Data,
    RemoveChild => Data,
    InsertBefore => Data,
    ReplaceChild => Data,
    SpliceBefore => Data,
    SpliceAppend => Data,
    SpliceRemove => Data,

    SetId => Data,
    SetSlot => Data,
    SetSlotName => Data,
    SetSlotElement => Data,
    SetInheritSlots => Data,
    RegisterStyleScope => Data,
    SetStyle => Data,
    AddClass => Data,
    RemoveClass => Data,
    ClearClasses => Data,
    SetClassAlias => Data,
    SetAttribute => Data,
    RemoveAttribute => Data,
    SetDataset => Data,
    SetText => Data,
    SetListenerStats => Data,

    OnCreateEvent => View,
    OnEvent => View,
    OnReleaseEvent => View,

    SetModelBindingStat => Data,
    SetModelBindingStatCallback => View,
    GetContext => Data,
    GetContextCallback => View,

    AssociateValue => Data,

    InitValues => Data,
    UpdateValues => Data,

    RegisterStyleSheetContent => Data,
    AppendStyleSheetPath => Data,
    DisableStyleSheet => Data,

    GetAllComputedStyles => Data,
    GetAllComputedStylesCallback => View,
    GetPseudoComputedStyles => Data,
    GetPseudoComputedStylesCallback => View,
    GetInheritedRules => Data,
    GetInheritedRulesCallback => View,
    GetMatchedRules => Data,
    GetMatchedRulesCallback => View,
    ReplaceStyleSheetAllProperties => Data,
    ReplaceStyleSheetAllPropertiesCallback => View,
    GetBoundingClientRect => Data,
    GetBoundingClientRectCallback => View,
    GetScrollOffset => Data,
    GetScrollOffsetCallback => View,
    SetScrollPosition => Data,
    GetBoxModel => Data,
    GetBoxModelCallback => View,
    GetPseudoTypes => Data,
    GetPseudoTypesCallback => View,
    StartOverlayInspect => Data,
    StartOverlayInspectCallback => View,
    StopOverlayInspect => Data,

    PerformanceStartTrace => Data,
    PerformanceEndTrace => Data,
    PerformanceStatsCallback => View,

    InsertDynamicSlot => View,
    UpdateDynamicSlot => View,
    RemoveDynamicSlot => View,

    CustomMethod => Data,
    CustomMethodNotify => View,
}

impl ChannelEventType {
    pub fn to_u8(&self) -> u8 {
        *self as u8 + 1
    }

    pub fn from_u64(value: u64) -> Result<Self, ProtocolError> {
        if value == 0 || value > Self::ALL.len() as u64 {
            return Err(ProtocolError::UnknownOpcode { opcode: value });
        }
        Ok(Self::ALL[(value - 1) as usize])
    }

    /// Like [`ChannelEventType::from_u64`], additionally rejecting opcodes
    /// that `receiver` must never see.
    pub fn for_receiver(value: u64, receiver: Side) -> Result<Self, ProtocolError> {
        let opcode = Self::from_u64(value)?;
        let sender = opcode.sender();
        if sender == receiver {
            return Err(ProtocolError::WrongDirection { opcode, sender });
        }
        Ok(opcode)
    }

    pub fn all() -> &'static [ChannelEventType] {
        Self::ALL
    }
}
