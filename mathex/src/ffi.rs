use libc::{c_char, c_double, c_int, c_uint, size_t};
use std::ffi::{c_void, CStr};

use crate::config::Config;
use crate::error::Error;
use crate::flags::Flags;

pub const MATHEX_SUCCESS: c_int = 0;
pub const MATHEX_ILLEGAL_NAME: c_int = 1;
pub const MATHEX_ALREADY_DEFINED: c_int = 2;
pub const MATHEX_UNDEFINED: c_int = 3;
pub const MATHEX_SYNTAX_ERROR: c_int = 4;
pub const MATHEX_INCORRECT_ARGS_NUM: c_int = 5;
pub const MATHEX_FUNCTION_ERROR: c_int = 6;
pub const MATHEX_INVALID_ARGUMENT: c_int = -1;

/// Signature of functions registered through [`mathex_add_function`].
///
/// The callback writes its result through `result` and returns
/// `MATHEX_SUCCESS`, or an error code that aborts the evaluation.
pub type MathexFunction =
    unsafe extern "C" fn(args: *const c_double, argc: size_t, result: *mut c_double) -> c_int;

fn error_code(error: &Error) -> c_int {
    match error {
        Error::IllegalName => MATHEX_ILLEGAL_NAME,
        Error::AlreadyDefined => MATHEX_ALREADY_DEFINED,
        Error::Undefined => MATHEX_UNDEFINED,
        Error::SyntaxError => MATHEX_SYNTAX_ERROR,
        Error::IncorrectArgsNum => MATHEX_INCORRECT_ARGS_NUM,
        Error::Custom(_) => MATHEX_FUNCTION_ERROR,
    }
}

fn error_from_code(code: c_int) -> Error {
    match code {
        MATHEX_ILLEGAL_NAME => Error::IllegalName,
        MATHEX_ALREADY_DEFINED => Error::AlreadyDefined,
        MATHEX_UNDEFINED => Error::Undefined,
        MATHEX_SYNTAX_ERROR => Error::SyntaxError,
        MATHEX_INCORRECT_ARGS_NUM => Error::IncorrectArgsNum,
        code => Error::Custom(format!("function failed with code {}", code)),
    }
}

fn status(result: Result<(), Error>) -> c_int {
    match result {
        Ok(()) => MATHEX_SUCCESS,
        Err(error) => error_code(&error),
    }
}

/// Writes `error` into the buffer as a NUL-terminated string, truncating it
/// to fit.
unsafe fn fill_error_buffer(output_error: *mut c_char, output_error_len: size_t, error: &str) {
    if output_error.is_null() || output_error_len == 0 {
        return;
    }

    let len = error.len().min(output_error_len - 1);
    let output_error = std::slice::from_raw_parts_mut(output_error as *mut u8, output_error_len);
    output_error[..len].copy_from_slice(&error.as_bytes()[..len]);
    output_error[len] = 0;
}

unsafe fn config_mut<'a>(config: *mut c_void) -> Option<&'a mut Config> {
    (config as *mut Config).as_mut()
}

unsafe fn str_arg<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    CStr::from_ptr(s).to_str().ok()
}

/// Create a configuration with the given flag bits.
///
/// Unknown bits are ignored. The returned pointer must be released with
/// [`mathex_config_free`].
#[no_mangle]
pub extern "C" fn mathex_config_new(flags: c_uint) -> *mut c_void {
    let config = Config::new(Flags::from_bits_truncate(flags));
    Box::into_raw(Box::new(config)) as *mut c_void
}

/// Free a configuration.
///
/// # Safety
///
/// The caller must ensure that the `config` pointer was returned by
/// [`mathex_config_new`] and was not freed before.
#[no_mangle]
pub unsafe extern "C" fn mathex_config_free(config: *mut c_void) {
    if config.is_null() {
        return;
    }

    drop(Box::from_raw(config as *mut Config));
}

/// Bind a variable to a caller-owned number.
///
/// The number is read each time an expression using it is evaluated.
///
/// # Safety
///
/// `config` must be a live configuration, `name` a valid C string, and `value`
/// must stay valid for as long as the variable is bound.
#[no_mangle]
pub unsafe extern "C" fn mathex_add_variable(
    config: *mut c_void,
    name: *const c_char,
    value: *const c_double,
) -> c_int {
    let (Some(config), Some(name)) = (config_mut(config), str_arg(name)) else {
        return MATHEX_INVALID_ARGUMENT;
    };
    if value.is_null() {
        return MATHEX_INVALID_ARGUMENT;
    }

    status(config.add_variable(name, move || unsafe { *value }))
}

/// Add a named constant.
///
/// # Safety
///
/// `config` must be a live configuration and `name` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn mathex_add_constant(
    config: *mut c_void,
    name: *const c_char,
    value: c_double,
) -> c_int {
    let (Some(config), Some(name)) = (config_mut(config), str_arg(name)) else {
        return MATHEX_INVALID_ARGUMENT;
    };

    status(config.add_constant(name, value))
}

/// Add a function implemented in C.
///
/// A callback error code between 1 and 5 is reported as the matching mathex
/// error; any other non-zero code is reported as `MATHEX_FUNCTION_ERROR`.
///
/// # Safety
///
/// `config` must be a live configuration and `name` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn mathex_add_function(
    config: *mut c_void,
    name: *const c_char,
    function: Option<MathexFunction>,
) -> c_int {
    let (Some(config), Some(name), Some(function)) = (config_mut(config), str_arg(name), function)
    else {
        return MATHEX_INVALID_ARGUMENT;
    };

    status(config.add_function(name, move |args| {
        let mut result = 0.0;
        match unsafe { function(args.as_ptr(), args.len(), &mut result) } {
            MATHEX_SUCCESS => Ok(result),
            code => Err(error_from_code(code)),
        }
    }))
}

/// Remove a variable, constant or function.
///
/// # Safety
///
/// `config` must be a live configuration and `name` a valid C string.
#[no_mangle]
pub unsafe extern "C" fn mathex_remove(config: *mut c_void, name: *const c_char) -> c_int {
    let (Some(config), Some(name)) = (config_mut(config), str_arg(name)) else {
        return MATHEX_INVALID_ARGUMENT;
    };

    status(config.remove(name))
}

/// Evaluate an expression.
///
/// # Arguments
///
/// * `config` - The configuration to evaluate against.
/// * `expression` - The expression to evaluate.
/// * `result` - Receives the result on success.
/// * `output_error` - The buffer to write the error message to. May be null.
/// * `output_error_len` - The length of the error buffer.
///
/// # Returns
///
/// `MATHEX_SUCCESS`, or the code of the error that stopped the evaluation.
///
/// # Safety
///
/// `config` must be a live configuration, `expression` a valid C string and
/// `result` a valid pointer. The `output_error` buffer must be valid and have
/// the length of at least `output_error_len`.
#[no_mangle]
pub unsafe extern "C" fn mathex_evaluate(
    config: *mut c_void,
    expression: *const c_char,
    result: *mut c_double,
    output_error: *mut c_char,
    output_error_len: size_t,
) -> c_int {
    let Some(config) = config_mut(config) else {
        fill_error_buffer(output_error, output_error_len, "Invalid config pointer!");
        return MATHEX_INVALID_ARGUMENT;
    };
    if result.is_null() {
        fill_error_buffer(output_error, output_error_len, "Invalid result pointer!");
        return MATHEX_INVALID_ARGUMENT;
    }
    let Some(expression) = str_arg(expression) else {
        fill_error_buffer(
            output_error,
            output_error_len,
            "Failed to convert the expression to a Rust string!",
        );
        return MATHEX_INVALID_ARGUMENT;
    };

    match config.evaluate(expression) {
        Ok(value) => {
            *result = value;
            MATHEX_SUCCESS
        }
        Err(error) => {
            fill_error_buffer(
                output_error,
                output_error_len,
                &format!("Failed to evaluate the expression: {}", error),
            );
            error_code(&error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::ffi::CString;

    unsafe extern "C" fn square(args: *const c_double, argc: size_t, result: *mut c_double) -> c_int {
        if argc != 1 {
            return MATHEX_INCORRECT_ARGS_NUM;
        }
        let x = *args;
        *result = x * x;
        MATHEX_SUCCESS
    }

    unsafe extern "C" fn broken(_: *const c_double, _: size_t, _: *mut c_double) -> c_int {
        42
    }

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    #[test]
    fn test_ffi_evaluate() {
        let x = Cell::new(3.0 as c_double);
        let mut result: c_double = 0.0;
        let mut error = [0 as c_char; 64];

        unsafe {
            let config = mathex_config_new(Flags::DEFAULT.bits());
            assert_eq!(mathex_add_variable(config, c("x").as_ptr(), x.as_ptr()), MATHEX_SUCCESS);
            assert_eq!(mathex_add_constant(config, c("k").as_ptr(), 2.0), MATHEX_SUCCESS);
            assert_eq!(
                mathex_add_function(config, c("sq").as_ptr(), Some(square)),
                MATHEX_SUCCESS
            );
            assert_eq!(
                mathex_add_constant(config, c("k").as_ptr(), 1.0),
                MATHEX_ALREADY_DEFINED
            );

            let status = mathex_evaluate(
                config,
                c("sq(x) + k").as_ptr(),
                &mut result,
                error.as_mut_ptr(),
                error.len(),
            );
            assert_eq!(status, MATHEX_SUCCESS);
            assert_eq!(result, 11.0);

            // The bound double is read on every evaluation
            x.set(4.0);
            let status = mathex_evaluate(
                config,
                c("sq(x) + k").as_ptr(),
                &mut result,
                error.as_mut_ptr(),
                error.len(),
            );
            assert_eq!(status, MATHEX_SUCCESS);
            assert_eq!(result, 18.0);

            assert_eq!(mathex_remove(config, c("k").as_ptr()), MATHEX_SUCCESS);
            assert_eq!(mathex_remove(config, c("k").as_ptr()), MATHEX_UNDEFINED);

            mathex_config_free(config);
        }
    }

    #[test]
    fn test_ffi_errors() {
        let mut result: c_double = 0.0;
        let mut error = [0 as c_char; 16];

        unsafe {
            let config = mathex_config_new(Flags::DEFAULT.bits());
            assert_eq!(
                mathex_add_function(config, c("sq").as_ptr(), Some(square)),
                MATHEX_SUCCESS
            );
            assert_eq!(
                mathex_add_function(config, c("broken").as_ptr(), Some(broken)),
                MATHEX_SUCCESS
            );
            assert_eq!(
                mathex_add_function(config, c("none").as_ptr(), None),
                MATHEX_INVALID_ARGUMENT
            );

            let status = mathex_evaluate(
                config,
                c("sq(1, 2)").as_ptr(),
                &mut result,
                error.as_mut_ptr(),
                error.len(),
            );
            assert_eq!(status, MATHEX_INCORRECT_ARGS_NUM);
            // Truncated and NUL-terminated
            let message = CStr::from_ptr(error.as_ptr()).to_str().unwrap();
            assert_eq!(message, "Failed to evalu");

            let status = mathex_evaluate(
                config,
                c("broken()").as_ptr(),
                &mut result,
                std::ptr::null_mut(),
                0,
            );
            assert_eq!(status, MATHEX_FUNCTION_ERROR);

            let status = mathex_evaluate(
                config,
                std::ptr::null(),
                &mut result,
                std::ptr::null_mut(),
                0,
            );
            assert_eq!(status, MATHEX_INVALID_ARGUMENT);

            mathex_config_free(config);
        }
    }
}
