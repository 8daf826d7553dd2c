//===========================================================================//

// Input bytes that can't be interpreted as a supported image.
macro_rules! decode_error {
    ($e:expr) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidData,
                                         $e))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidData,
                                         format!($fmt, $($arg)+)))
    };
}

// Dimensions or entry counts that an ICO file can't represent.
macro_rules! size_range_error {
    ($e:expr) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidInput,
                                         $e))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::InvalidInput,
                                         format!($fmt, $($arg)+)))
    };
}

// The PNG encoder rejected an otherwise valid pixel buffer.
macro_rules! encode_error {
    ($fmt:expr, $($arg:tt)+) => {
        return Err(::std::io::Error::new(::std::io::ErrorKind::Other,
                                         format!($fmt, $($arg)+)))
    };
}

//===========================================================================//
