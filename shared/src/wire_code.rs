macro_rules! wire_code_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident = $value:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            PartialEq,
            Eq,
            Clone,
            Copy,
            Hash,
            strum_macros::Display,
            strum_macros::EnumIter,
        )]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        #[repr(u8)]
        $vis enum $name {
            $($variant = $value),*
        }

        impl $name {
            pub fn to_byte(&self) -> u8 {
                *self as u8
            }

            pub fn from_byte(byte: u8) -> Option<Self> {
                match byte {
                    $($value => Some($name::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

wire_code_enum! {
    /// Room lifecycle operation carried in the second byte of a control frame.
    pub enum ControlOperation {
        CreateRoom = 0,
        SearchRoomById = 1,
        JoinRoom = 2,
        LeaveRoom = 3,
    }
}

wire_code_enum! {
    /// Third byte of a control frame.
    pub enum ControlState {
        Request = 0,
        Ack = 1,
        Success = 2,
        Fail = 3,
        Invalid = 4,
    }
}

wire_code_enum! {
    pub enum ChatOperation {
        SendMessage = 0,
        SendAddress = 1,
        Exit = 2,
    }
}
