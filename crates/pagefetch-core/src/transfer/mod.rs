//! One GET on a libcurl easy handle, run on its own thread.
//!
//! The worker reports "headers received" and then the finished response over
//! a channel, so the caller can bound the wait for headers with
//! `recv_timeout`. Aborting sets a flag that the progress callback checks;
//! returning false from it makes libcurl stop the transfer and close the
//! connection. libcurl calls the progress callback at least once a second
//! even while idle.

mod head;

use curl::easy::{Easy, List};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use crate::error::FetchError;
use head::HeadCollector;
pub(crate) use head::ResponseHead;

const MAX_REDIRECTS: u32 = 50;

/// Fixed request headers. `User-Agent` is set through libcurl.
const REQUEST_HEADERS: &[&str] = &["Accept: */*", "Accept-Encoding: gzip", "Content-Length: 0"];

/// What the worker needs to issue the request.
#[derive(Debug, Clone)]
pub(crate) struct TransferSpec {
    pub url: String,
    pub user_agent: String,
    /// libcurl proxy string; `None` forces a direct connection.
    pub proxy: Option<String>,
}

/// Final response: last header block plus the raw (possibly compressed) body.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: u32,
    pub head: ResponseHead,
    pub body: Vec<u8>,
}

enum Event {
    HeadersReceived,
    Finished(Result<RawResponse, FetchError>),
}

/// Handle on an in-flight transfer. Dropping it aborts the transfer.
pub(crate) struct Transfer {
    events: Receiver<Event>,
    cancel: Arc<AtomicBool>,
    early: Option<Result<RawResponse, FetchError>>,
}

impl Transfer {
    /// Issue the request on a worker thread and return immediately.
    pub(crate) fn start(spec: TransferSpec) -> Transfer {
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_worker = Arc::clone(&cancel);
        std::thread::spawn(move || {
            let result = perform(&spec, &cancel_worker, &tx);
            if let Err(e) = &result {
                tracing::debug!(url = %spec.url, "transfer ended with error: {}", e);
            }
            // Receiver is gone once the caller timed out; the result is discarded.
            let _ = tx.send(Event::Finished(result));
        });
        Transfer {
            events: rx,
            cancel,
            early: None,
        }
    }

    /// Block until response headers arrive or `timeout` expires. Every failure
    /// aborts the transfer before it is returned.
    pub(crate) fn wait_for_headers(&mut self, timeout: Duration) -> Result<(), FetchError> {
        match self.events.recv_timeout(timeout) {
            Ok(Event::HeadersReceived) => Ok(()),
            Ok(Event::Finished(Ok(response))) => {
                self.early = Some(Ok(response));
                Ok(())
            }
            Ok(Event::Finished(Err(e))) => {
                self.abort();
                Err(e)
            }
            Err(RecvTimeoutError::Timeout) => {
                self.abort();
                Err(FetchError::Timeout(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.abort();
                Err(FetchError::WorkerLost)
            }
        }
    }

    /// Wait for the body. Not time-limited.
    pub(crate) fn finish(mut self) -> Result<RawResponse, FetchError> {
        if let Some(result) = self.early.take() {
            return result;
        }
        loop {
            match self.events.recv() {
                Ok(Event::Finished(result)) => return result,
                Ok(Event::HeadersReceived) => continue,
                Err(_) => return Err(FetchError::WorkerLost),
            }
        }
    }

    /// Ask the worker to stop. Cannot fail; a late result is discarded.
    pub(crate) fn abort(&self) {
        if !self.cancel.swap(true, Ordering::Relaxed) {
            tracing::debug!("aborting in-flight transfer");
        }
    }
}

impl Drop for Transfer {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

fn perform(
    spec: &TransferSpec,
    cancel: &AtomicBool,
    events: &Sender<Event>,
) -> Result<RawResponse, FetchError> {
    let mut easy = Easy::new();
    easy.url(&spec.url)?;
    easy.get(true)?;
    easy.useragent(&spec.user_agent)?;
    easy.follow_location(true)?;
    easy.max_redirections(MAX_REDIRECTS)?;
    // An empty proxy string also stops libcurl from reading *_proxy env vars.
    easy.proxy(spec.proxy.as_deref().unwrap_or(""))?;
    easy.progress(true)?;

    let mut list = List::new();
    for header in REQUEST_HEADERS {
        list.append(header)?;
    }
    easy.http_headers(list)?;

    let mut heads = HeadCollector::new(&spec.url, spec.proxy.as_deref());
    let mut body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if heads.push(data) {
                let _ = events.send(Event::HeadersReceived);
            }
            true
        })?;
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.progress_function(|_, _, _, _| !cancel.load(Ordering::Relaxed))?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    Ok(RawResponse {
        status,
        head: heads.into_head(),
        body,
    })
}
