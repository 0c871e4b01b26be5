// parkgate/src/config.rs

use std::time::Duration;

use crate::constants::{
    BALANCE_BLOCK, DEFAULT_ADDRESS, DEFAULT_AUTH_KEY, DEFAULT_MAX_BALANCE, OWNER_BLOCK,
};
use crate::utils::timeout::{
    ms, DEFAULT_AUTO_SEARCH_INTERVAL_MS, DEFAULT_DEDUP_RETENTION_MS, DEFAULT_DEDUP_WINDOW_MS,
    DEFAULT_MAX_REPLY_RETRIES, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REPLY_TIMEOUT_MS,
};

/// Default reader baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 19_200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopBits {
    #[default]
    One,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlowControl {
    #[default]
    None,
    Software,
    Hardware,
}

/// Serial line parameters. Defaults match the reader module: 19200 8N1,
/// no flow control.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortConfig {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
        }
    }
}

impl PortConfig {
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            ..Self::default()
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
}

/// Terminal tuning. Every timer and limit the session logic uses lives
/// here so tests can shrink or stretch them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerminalConfig {
    pub port: PortConfig,
    pub address: u16,
    pub reply_timeout: Duration,
    pub max_reply_retries: u32,
    pub poll_interval: Duration,
    pub auto_search_interval: Duration,
    pub dedup_window: Duration,
    pub dedup_retention: Duration,
    pub auth_key: [u8; 6],
    pub owner_block: u8,
    pub balance_block: u8,
    pub max_balance: i32,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            port: PortConfig::default(),
            address: DEFAULT_ADDRESS,
            reply_timeout: ms(DEFAULT_REPLY_TIMEOUT_MS),
            max_reply_retries: DEFAULT_MAX_REPLY_RETRIES,
            poll_interval: ms(DEFAULT_POLL_INTERVAL_MS),
            auto_search_interval: ms(DEFAULT_AUTO_SEARCH_INTERVAL_MS),
            dedup_window: ms(DEFAULT_DEDUP_WINDOW_MS),
            dedup_retention: ms(DEFAULT_DEDUP_RETENTION_MS),
            auth_key: DEFAULT_AUTH_KEY,
            owner_block: OWNER_BLOCK,
            balance_block: BALANCE_BLOCK,
            max_balance: DEFAULT_MAX_BALANCE,
        }
    }
}

impl TerminalConfig {
    pub fn with_port(mut self, port: PortConfig) -> Self {
        self.port = port;
        self
    }

    pub fn with_address(mut self, address: u16) -> Self {
        self.address = address;
        self
    }

    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    pub fn with_max_reply_retries(mut self, retries: u32) -> Self {
        self.max_reply_retries = retries;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_auto_search_interval(mut self, interval: Duration) -> Self {
        self.auto_search_interval = interval;
        self
    }

    pub fn with_dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window = window;
        self
    }

    pub fn with_dedup_retention(mut self, retention: Duration) -> Self {
        self.dedup_retention = retention;
        self
    }

    pub fn with_auth_key(mut self, key: [u8; 6]) -> Self {
        self.auth_key = key;
        self
    }

    pub fn with_max_balance(mut self, max_balance: i32) -> Self {
        self.max_balance = max_balance;
        self
    }
}
