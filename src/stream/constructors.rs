//! Stream constructors: empty, once, from_iter, eval, unwrap, unfold,
//! range, bracket, from_queue.

use std::future::Future;
use std::marker::PhantomData;

use super::core::Stream;
use crate::queue::Queue;
use crate::step::Step;

// ================================
// Basic Constructors
// ================================

/// The stream with no elements.
pub struct Empty<A, E> {
    pub(crate) _phantom: PhantomData<fn() -> (A, E)>,
}

impl<A, E> Clone for Empty<A, E> {
    fn clone(&self) -> Self {
        Empty {
            _phantom: PhantomData,
        }
    }
}

impl<A, E> Stream for Empty<A, E>
where
    A: Send + 'static,
    E: Send + 'static,
{
    type Item = A;
    type Error = E;

    async fn fold<T, St, Fut>(self, init: T, _step: St) -> Result<Step<T>, E>
    where
        T: Send,
        St: FnMut(T, A) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, E>> + Send,
    {
        Ok(Step::Cont(init))
    }
}

/// A single-element stream.
pub struct Once<A, E> {
    pub(crate) value: A,
    pub(crate) _phantom: PhantomData<fn() -> E>,
}

impl<A: Clone, E> Clone for Once<A, E> {
    fn clone(&self) -> Self {
        Once {
            value: self.value.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<A, E> Stream for Once<A, E>
where
    A: Send + 'static,
    E: Send + 'static,
{
    type Item = A;
    type Error = E;

    async fn fold<T, St, Fut>(self, init: T, mut step: St) -> Result<Step<T>, E>
    where
        T: Send,
        St: FnMut(T, A) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, E>> + Send,
    {
        step(init, self.value).await
    }
}

/// A stream traversing an iterator synchronously.
pub struct Iter<I, E> {
    pub(crate) iter: I,
    pub(crate) _phantom: PhantomData<fn() -> E>,
}

impl<I: Clone, E> Clone for Iter<I, E> {
    fn clone(&self) -> Self {
        Iter {
            iter: self.iter.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<I, E> Stream for Iter<I, E>
where
    I: Iterator + Send,
    I::Item: Send + 'static,
    E: Send + 'static,
{
    type Item = I::Item;
    type Error = E;

    async fn fold<T, St, Fut>(self, init: T, mut step: St) -> Result<Step<T>, E>
    where
        T: Send,
        St: FnMut(T, I::Item) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, E>> + Send,
    {
        let mut state = Step::Cont(init);
        for a in self.iter {
            match state {
                Step::Cont(s) => state = step(s, a).await?,
                Step::Stop(_) => break,
            }
        }
        Ok(state)
    }
}

/// A stream of the single value produced by an effect.
pub struct Eval<Fut> {
    pub(crate) future: Fut,
}

impl<A, E, Fut> Stream for Eval<Fut>
where
    A: Send + 'static,
    E: Send + 'static,
    Fut: Future<Output = Result<A, E>> + Send,
{
    type Item = A;
    type Error = E;

    async fn fold<T, St, Fut2>(self, init: T, mut step: St) -> Result<Step<T>, E>
    where
        T: Send,
        St: FnMut(T, A) -> Fut2 + Send,
        Fut2: Future<Output = Result<Step<T>, E>> + Send,
    {
        let a = self.future.await?;
        step(init, a).await
    }
}

/// A stream delegating to the stream produced by an effect.
pub struct Unwrap<Fut> {
    pub(crate) future: Fut,
}

impl<Inner, Fut> Stream for Unwrap<Fut>
where
    Inner: Stream,
    Fut: Future<Output = Result<Inner, Inner::Error>> + Send,
{
    type Item = Inner::Item;
    type Error = Inner::Error;

    async fn fold<T, St, Fut2>(self, init: T, step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, Inner::Item) -> Fut2 + Send,
        Fut2: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let inner = self.future.await?;
        inner.fold(init, step).await
    }
}

// ================================
// Corecursion
// ================================

/// Pure corecursive stream: `f` produces an element and the next seed, or
/// `None` to end.
pub struct Unfold<Z, F, E> {
    pub(crate) state: Z,
    pub(crate) f: F,
    pub(crate) _phantom: PhantomData<fn() -> E>,
}

impl<Z: Clone, F: Clone, E> Clone for Unfold<Z, F, E> {
    fn clone(&self) -> Self {
        Unfold {
            state: self.state.clone(),
            f: self.f.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<Z, A, F, E> Stream for Unfold<Z, F, E>
where
    Z: Send,
    A: Send + 'static,
    F: FnMut(Z) -> Option<(A, Z)> + Send,
    E: Send + 'static,
{
    type Item = A;
    type Error = E;

    async fn fold<T, St, Fut>(self, init: T, mut step: St) -> Result<Step<T>, E>
    where
        T: Send,
        St: FnMut(T, A) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, E>> + Send,
    {
        let mut f = self.f;
        let mut z = self.state;
        let mut state = Step::Cont(init);
        loop {
            match state {
                stopped @ Step::Stop(_) => return Ok(stopped),
                Step::Cont(s) => match f(z) {
                    None => return Ok(Step::Cont(s)),
                    Some((a, next)) => {
                        z = next;
                        state = step(s, a).await?;
                    }
                },
            }
        }
    }
}

/// Effectful corecursive stream.
pub struct UnfoldEval<Z, F> {
    pub(crate) state: Z,
    pub(crate) f: F,
}

impl<Z, A, E, F, Fut0> Stream for UnfoldEval<Z, F>
where
    Z: Send,
    A: Send + 'static,
    E: Send + 'static,
    F: FnMut(Z) -> Fut0 + Send,
    Fut0: Future<Output = Result<Option<(A, Z)>, E>> + Send,
{
    type Item = A;
    type Error = E;

    async fn fold<T, St, Fut>(self, init: T, mut step: St) -> Result<Step<T>, E>
    where
        T: Send,
        St: FnMut(T, A) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, E>> + Send,
    {
        let mut f = self.f;
        let mut z = self.state;
        let mut state = Step::Cont(init);
        loop {
            match state {
                stopped @ Step::Stop(_) => return Ok(stopped),
                Step::Cont(s) => match f(z).await? {
                    None => return Ok(Step::Cont(s)),
                    Some((a, next)) => {
                        z = next;
                        state = step(s, a).await?;
                    }
                },
            }
        }
    }
}

/// Inclusive integer range.
pub struct Range<E> {
    pub(crate) current: i32,
    pub(crate) max: i32,
    pub(crate) _phantom: PhantomData<fn() -> E>,
}

impl<E> Clone for Range<E> {
    fn clone(&self) -> Self {
        Range {
            current: self.current,
            max: self.max,
            _phantom: PhantomData,
        }
    }
}

impl<E> Stream for Range<E>
where
    E: Send + 'static,
{
    type Item = i32;
    type Error = E;

    async fn fold<T, St, Fut>(self, init: T, mut step: St) -> Result<Step<T>, E>
    where
        T: Send,
        St: FnMut(T, i32) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, E>> + Send,
    {
        let mut state = Step::Cont(init);
        let mut i = self.current;
        while i <= self.max {
            match state {
                Step::Cont(s) => {
                    state = step(s, i).await?;
                    i += 1;
                }
                Step::Stop(_) => break,
            }
        }
        Ok(state)
    }
}

// ================================
// Resource Management
// ================================

/// Spawns the release effect if the resource was never released in-line,
/// which happens when the enclosing fold future is cancelled mid-flight.
struct ReleaseGuard<R, Rel, RelFut>
where
    R: Send + 'static,
    Rel: FnOnce(R) -> RelFut,
    RelFut: Future<Output = ()> + Send + 'static,
{
    inner: Option<(R, Rel)>,
    _phantom: PhantomData<fn() -> RelFut>,
}

impl<R, Rel, RelFut> ReleaseGuard<R, Rel, RelFut>
where
    R: Send + 'static,
    Rel: FnOnce(R) -> RelFut,
    RelFut: Future<Output = ()> + Send + 'static,
{
    fn new(resource: R, release: Rel) -> Self {
        ReleaseGuard {
            inner: Some((resource, release)),
            _phantom: PhantomData,
        }
    }

    fn resource(&self) -> R
    where
        R: Clone,
    {
        self.inner
            .as_ref()
            .expect("Resource should be available until release")
            .0
            .clone()
    }

    async fn release(mut self) {
        if let Some((resource, release)) = self.inner.take() {
            release(resource).await;
        }
    }
}

impl<R, Rel, RelFut> Drop for ReleaseGuard<R, Rel, RelFut>
where
    R: Send + 'static,
    Rel: FnOnce(R) -> RelFut,
    RelFut: Future<Output = ()> + Send + 'static,
{
    fn drop(&mut self) {
        if let Some((resource, release)) = self.inner.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(release(resource));
            }
        }
    }
}

/// A stream pulling elements out of a scoped resource.
///
/// The resource is acquired when the fold starts and released exactly once
/// on every exit: exhaustion (`read` returns `None`), early stop, failure
/// of `read` or of the downstream step, and cancellation of the fold.
pub struct Bracket<AcqFut, Rel, Read> {
    pub(crate) acquire: AcqFut,
    pub(crate) release: Rel,
    pub(crate) read: Read,
}

impl<R, B, E, AcqFut, Rel, RelFut, Read, ReadFut> Stream for Bracket<AcqFut, Rel, Read>
where
    R: Clone + Send + 'static,
    B: Send + 'static,
    E: Send + 'static,
    AcqFut: Future<Output = Result<R, E>> + Send,
    Rel: FnOnce(R) -> RelFut + Send,
    RelFut: Future<Output = ()> + Send + 'static,
    Read: FnMut(R) -> ReadFut + Send,
    ReadFut: Future<Output = Result<Option<B>, E>> + Send,
{
    type Item = B;
    type Error = E;

    async fn fold<T, St, Fut>(self, init: T, mut step: St) -> Result<Step<T>, E>
    where
        T: Send,
        St: FnMut(T, B) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, E>> + Send,
    {
        let resource = self.acquire.await?;
        let guard = ReleaseGuard::new(resource, self.release);
        let mut read = self.read;
        let mut s = init;
        let outcome = loop {
            match read(guard.resource()).await {
                Err(e) => break Err(e),
                Ok(None) => break Ok(Step::Cont(s)),
                Ok(Some(b)) => match step(s, b).await {
                    Err(e) => break Err(e),
                    Ok(Step::Cont(next)) => s = next,
                    Ok(Step::Stop(next)) => break Ok(Step::Stop(next)),
                },
            }
        };
        guard.release().await;
        outcome
    }
}

/// An infinite stream reading from a queue.
pub struct FromQueue<A, E> {
    pub(crate) queue: Queue<A>,
    pub(crate) _phantom: PhantomData<fn() -> E>,
}

impl<A, E> Stream for FromQueue<A, E>
where
    A: Send + 'static,
    E: Send + 'static,
{
    type Item = A;
    type Error = E;

    async fn fold<T, St, Fut>(self, init: T, mut step: St) -> Result<Step<T>, E>
    where
        T: Send,
        St: FnMut(T, A) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, E>> + Send,
    {
        let mut state = Step::Cont(init);
        loop {
            match state {
                stopped @ Step::Stop(_) => return Ok(stopped),
                Step::Cont(s) => match self.queue.take().await {
                    Some(a) => state = step(s, a).await?,
                    // A closed and drained queue ends the stream.
                    None => return Ok(Step::Cont(s)),
                },
            }
        }
    }
}

// ================================
// Constructor Functions
// ================================

/// Create an empty stream.
pub fn empty<A, E>() -> Empty<A, E> {
    Empty {
        _phantom: PhantomData,
    }
}

/// Create a stream that emits a single value.
pub fn once<A, E>(value: A) -> Once<A, E> {
    Once {
        value,
        _phantom: PhantomData,
    }
}

/// Create a stream from anything iterable.
pub fn from_iter<I, E>(iter: I) -> Iter<I::IntoIter, E>
where
    I: IntoIterator,
{
    Iter {
        iter: iter.into_iter(),
        _phantom: PhantomData,
    }
}

/// Create a stream over a chunk of elements.
pub fn from_chunk<A, E>(chunk: Vec<A>) -> Iter<std::vec::IntoIter<A>, E> {
    from_iter(chunk)
}

/// Create a stream of the single value an effect evaluates to.
pub fn eval<A, E, Fut>(future: Fut) -> Eval<Fut>
where
    Fut: Future<Output = Result<A, E>>,
{
    Eval { future }
}

/// Create a stream from a stream-producing effect.
pub fn unwrap<Inner, Fut>(future: Fut) -> Unwrap<Fut>
where
    Inner: Stream,
    Fut: Future<Output = Result<Inner, Inner::Error>>,
{
    Unwrap { future }
}

/// Create a stream from a seed and a pure step function.
pub fn unfold<Z, A, F, E>(init: Z, f: F) -> Unfold<Z, F, E>
where
    F: FnMut(Z) -> Option<(A, Z)>,
{
    Unfold {
        state: init,
        f,
        _phantom: PhantomData,
    }
}

/// Create a stream from a seed and an effectful step function.
pub fn unfold_eval<Z, A, E, F, Fut>(init: Z, f: F) -> UnfoldEval<Z, F>
where
    F: FnMut(Z) -> Fut,
    Fut: Future<Output = Result<Option<(A, Z)>, E>>,
{
    UnfoldEval { state: init, f }
}

/// Create a stream of the integers from `min` to `max`, inclusive.
pub fn range<E>(min: i32, max: i32) -> Range<E> {
    Range {
        current: min,
        max,
        _phantom: PhantomData,
    }
}

/// Create a stream around a scoped resource.
///
/// `acquire` runs once; `read` is pulled for each element until it yields
/// `None`; `release` runs exactly once on every exit, including cancellation.
pub fn bracket<R, B, E, AcqFut, Rel, RelFut, Read, ReadFut>(
    acquire: AcqFut,
    release: Rel,
    read: Read,
) -> Bracket<AcqFut, Rel, Read>
where
    R: Clone + Send + 'static,
    B: Send + 'static,
    E: Send + 'static,
    AcqFut: Future<Output = Result<R, E>>,
    Rel: FnOnce(R) -> RelFut,
    RelFut: Future<Output = ()> + Send + 'static,
    Read: FnMut(R) -> ReadFut,
    ReadFut: Future<Output = Result<Option<B>, E>>,
{
    Bracket {
        acquire,
        release,
        read,
    }
}

/// Create an infinite stream draining a queue.
pub fn from_queue<A, E>(queue: Queue<A>) -> FromQueue<A, E> {
    FromQueue {
        queue,
        _phantom: PhantomData,
    }
}
