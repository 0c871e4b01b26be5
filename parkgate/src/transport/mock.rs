// parkgate/src/transport/mock.rs

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::config::PortConfig;
use crate::transport::traits::Transport;
use crate::{Error, Result};

#[derive(Debug, Default)]
struct MockState {
    open: bool,
    sent: Vec<Vec<u8>>,
    incoming: VecDeque<Vec<u8>>,
    /// Testing hook: number of write_bytes calls that should fail
    write_failures: usize,
    fail_open: bool,
}

/// Mock transport for unit tests. It records written chunks and returns
/// queued inbound chunks. Clones share state, so a test can keep a handle
/// after giving the transport to a `Reader`.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Rc<RefCell<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes to be returned by the next `read_available`.
    pub fn push_incoming(&self, bytes: &[u8]) {
        self.state.borrow_mut().incoming.push_back(bytes.to_vec());
    }

    /// Every chunk written so far, oldest first.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.state.borrow().sent.clone()
    }

    pub fn take_sent(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.state.borrow_mut().sent)
    }

    /// Set how many subsequent writes should fail (for tests).
    pub fn set_write_failures(&self, n: usize) {
        self.state.borrow_mut().write_failures = n;
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.state.borrow_mut().fail_open = fail;
    }
}

impl Transport for MockTransport {
    fn open(&mut self, _config: &PortConfig) -> Result<()> {
        let mut st = self.state.borrow_mut();
        if st.fail_open {
            return Err(Error::Transport("mock open failure".into()));
        }
        if st.open {
            return Err(Error::AlreadyOpen);
        }
        st.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.state.borrow_mut().open = false;
    }

    fn is_open(&self) -> bool {
        self.state.borrow().open
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let mut st = self.state.borrow_mut();
        if !st.open {
            return Err(Error::NotOpen);
        }
        if st.write_failures > 0 {
            st.write_failures -= 1;
            return Err(Error::Transport("mock write failure".into()));
        }
        st.sent.push(bytes.to_vec());
        Ok(())
    }

    fn read_available(&mut self) -> Result<Vec<u8>> {
        let mut st = self.state.borrow_mut();
        if !st.open {
            return Err(Error::NotOpen);
        }
        Ok(st.incoming.drain(..).flatten().collect())
    }
}
