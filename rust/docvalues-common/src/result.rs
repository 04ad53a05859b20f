pub type Result<T> = std::result::Result<T, crate::error::Error>;

#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

/// Fails with a corruption error unless the condition holds.
#[macro_export]
macro_rules! verify_data {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_data(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[inline]
pub fn verify_data(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        corruption(name, condition)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cold]
pub fn corruption(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::Corruption {
        element: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    fn check_len(len: i64) -> super::Result<i64> {
        verify_data!(len, len >= 0);
        Ok(len)
    }

    fn check_block(block_size: u32) -> super::Result<()> {
        verify_arg!(block_size, block_size.is_power_of_two());
        Ok(())
    }

    #[test]
    fn test_verify_data() {
        assert_eq!(check_len(5).unwrap(), 5);
        let e = check_len(-1).unwrap_err();
        match e.kind() {
            ErrorKind::Corruption { element, message } => {
                assert_eq!(element, "len");
                assert_eq!(message, "len >= 0");
            }
            _ => panic!("unexpected error {e}"),
        }
    }

    #[test]
    fn test_verify_arg() {
        assert!(check_block(64).is_ok());
        assert!(matches!(
            check_block(65).unwrap_err().kind(),
            ErrorKind::InvalidArgument { .. }
        ));
    }
}
