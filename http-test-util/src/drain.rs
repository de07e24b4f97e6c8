use bytes::Buf;
use hyper::body::Body;
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

pin_project! {
    /// Polls a body to the end without keeping any of it, resolving to the number of data
    /// bytes that went by.
    ///
    /// A response body has to be read out before hyper hands its connection back to the pool.
    pub struct DiscardBodyFuture<B: Body> {
        #[pin]
        body: B,
        discarded: u64,
    }
}

impl<B> DiscardBodyFuture<B>
where
    B: Body,
{
    #[inline]
    #[must_use]
    pub fn new(body: B) -> Self {
        Self { body, discarded: 0 }
    }
}

impl<B> Future for DiscardBodyFuture<B>
where
    B: Body,
{
    type Output = Result<u64, B::Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slf = self.project();
        loop {
            if slf.body.is_end_stream() {
                return Poll::Ready(Ok(*slf.discarded));
            }
            let Some(next_res) = ready!(slf.body.as_mut().poll_frame(cx)) else {
                return Poll::Ready(Ok(*slf.discarded));
            };
            let frame = match next_res {
                Ok(frame) => frame,
                Err(e) => return Poll::Ready(Err(e)),
            };
            // Trailers carry no payload, skip them.
            if let Some(data) = frame.data_ref() {
                *slf.discarded += data.remaining() as u64;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DiscardBodyFuture;
    use crate::{byte_body, empty_body};

    #[test]
    fn discards_empty_body() {
        let fut = DiscardBodyFuture::new(empty_body());
        let n = poll_ready(fut).unwrap();
        assert_eq!(0, n);
    }

    #[test]
    fn counts_discarded_bytes() {
        let fut = DiscardBodyFuture::new(byte_body(&b"Hello World!"[..]));
        let n = poll_ready(fut).unwrap();
        assert_eq!(12, n);
    }

    // `Full` never returns pending, one poll with a no-op waker is enough.
    fn poll_ready<F: std::future::Future>(fut: F) -> F::Output {
        let mut fut = std::pin::pin!(fut);
        let mut cx = std::task::Context::from_waker(std::task::Waker::noop());
        match fut.as_mut().poll(&mut cx) {
            std::task::Poll::Ready(out) => out,
            std::task::Poll::Pending => panic!("full body should be ready immediately"),
        }
    }
}
