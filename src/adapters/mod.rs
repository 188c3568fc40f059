//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                          | Connects to               |
//! |------------|-------------------------------------|---------------------------|
//! | `console`  | process-wide text sink              | console UART / stdout     |
//! | `endpoint` | AuthPort, FileTransferPort          | endpoint service over TCP |
//! | `modem`    | ModemControlPort, SecureStorePort,  | AT link over UART1 /      |
//! |            | PdnPort                             | simulated modem           |
//! | `time`     | TimePort                            | ESP high-res timer        |

pub mod console;
pub mod endpoint;
pub mod modem;
pub mod time;
