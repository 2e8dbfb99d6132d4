//! Concurrent combinators: merge, zip, join.
//!
//! Each source runs in its own background task and communicates with the
//! consumer loop through bounded [`Take`](crate::take::Take) queues (see
//! [`bridge`](super::bridge)). Producer tasks are aborted whenever the
//! consumer exits, whatever the reason. Per-source emission order is
//! preserved; for merges the interleaving between sources is whatever queue
//! arrival order produces.

use std::future::Future;
use std::marker::PhantomData;

use either::Either;
use futures_util::future::BoxFuture;

use super::bridge::{spawn_source, to_queue, Pull, StreamQueue};
use super::core::Stream;
use crate::queue::Queue;
use crate::step::Step;
use crate::take::Take;

// ================================
// Merge
// ================================

/// Two sources pushed through one shared bounded queue, each mapped into a
/// common element type.
pub struct MergeWith<L, R, FL, FR, C> {
    pub(crate) left: L,
    pub(crate) right: R,
    pub(crate) capacity: usize,
    pub(crate) fl: FL,
    pub(crate) fr: FR,
    pub(crate) _phantom: PhantomData<C>,
}

/// Same-type merge.
pub type Merge<L, R, A> = MergeWith<L, R, fn(A) -> A, fn(A) -> A, A>;

/// Merge tagging each element with its source.
pub type MergeEither<L, R, A, B> =
    MergeWith<L, R, fn(A) -> Either<A, B>, fn(B) -> Either<A, B>, Either<A, B>>;

impl<L, R, FL, FR, C> Stream for MergeWith<L, R, FL, FR, C>
where
    L: Stream + 'static,
    R: Stream<Error = L::Error> + 'static,
    FL: FnMut(L::Item) -> C + Send,
    FR: FnMut(R::Item) -> C + Send,
    C: Send + 'static,
{
    type Item = C;
    type Error = L::Error;

    async fn fold<T, St, Fut>(self, init: T, mut step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, C) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let queue: Queue<Either<Take<L::Error, L::Item>, Take<L::Error, R::Item>>> =
            Queue::bounded(self.capacity);
        // Both producers are interrupted when these guards drop, so an
        // early stop or failure below also cancels the sources.
        let _left_guard = spawn_source(self.left, queue.clone(), Either::Left);
        let _right_guard = spawn_source(self.right, queue.clone(), Either::Right);

        let mut fl = self.fl;
        let mut fr = self.fr;
        let mut left_done = false;
        let mut right_done = false;
        let mut s = init;
        loop {
            match queue.take().await {
                None => return Ok(Step::Cont(s)),
                Some(Either::Left(take)) => match take {
                    Take::Value(a) => match step(s, fl(a)).await? {
                        Step::Cont(next) => s = next,
                        Step::Stop(next) => return Ok(Step::Stop(next)),
                    },
                    Take::Fail(e) => return Err(e),
                    Take::End => {
                        left_done = true;
                        if right_done {
                            return Ok(Step::Cont(s));
                        }
                    }
                },
                Some(Either::Right(take)) => match take {
                    Take::Value(b) => match step(s, fr(b)).await? {
                        Step::Cont(next) => s = next,
                        Step::Stop(next) => return Ok(Step::Stop(next)),
                    },
                    Take::Fail(e) => return Err(e),
                    Take::End => {
                        right_done = true;
                        if left_done {
                            return Ok(Step::Cont(s));
                        }
                    }
                },
            }
        }
    }
}

// ================================
// Zip / Join
// ================================

/// Positional pairing of two sources through per-side bounded queues.
pub struct ZipWith<L, R, F, C> {
    pub(crate) left: L,
    pub(crate) right: R,
    pub(crate) lc: usize,
    pub(crate) rc: usize,
    pub(crate) f: F,
    pub(crate) _phantom: PhantomData<C>,
}

/// Tuple zip.
pub type Zip<L, R, A, B> = ZipWith<L, R, fn(Option<A>, Option<B>) -> Option<(A, B)>, (A, B)>;

fn zip_pair<A, B>(a: Option<A>, b: Option<B>) -> Option<(A, B)> {
    a.zip(b)
}

impl<L, R, F, C> Stream for ZipWith<L, R, F, C>
where
    L: Stream + 'static,
    R: Stream<Error = L::Error> + 'static,
    F: FnMut(Option<L::Item>, Option<R::Item>) -> Option<C> + Send,
    C: Send + 'static,
{
    type Item = C;
    type Error = L::Error;

    async fn fold<T, St, Fut>(self, init: T, mut step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, C) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let left_queue = Queue::bounded(self.lc);
        let right_queue = Queue::bounded(self.rc);
        let _left_guard = spawn_source(self.left, left_queue.clone(), |take| take);
        let _right_guard = spawn_source(self.right, right_queue.clone(), |take| take);
        let mut left = Pull::new(left_queue);
        let mut right = Pull::new(right_queue);

        let mut f = self.f;
        let mut s = init;
        loop {
            let a = left.pull().await?;
            let b = right.pull().await?;
            match f(a, b) {
                None => return Ok(Step::Cont(s)),
                Some(c) => match step(s, c).await? {
                    Step::Cont(next) => s = next,
                    Step::Stop(next) => return Ok(Step::Stop(next)),
                },
            }
        }
    }
}

/// Like [`ZipWith`], but the joiner itself decides which side to pull on
/// each tick, through the two [`Pull`] handles.
pub struct JoinWith<L, R, F, C> {
    pub(crate) left: L,
    pub(crate) right: R,
    pub(crate) lc: usize,
    pub(crate) rc: usize,
    pub(crate) f: F,
    pub(crate) _phantom: PhantomData<C>,
}

impl<L, R, F, C> Stream for JoinWith<L, R, F, C>
where
    L: Stream + 'static,
    R: Stream<Error = L::Error> + 'static,
    F: for<'a> FnMut(
            &'a mut Pull<L::Error, L::Item>,
            &'a mut Pull<L::Error, R::Item>,
        ) -> BoxFuture<'a, Result<Option<C>, L::Error>>
        + Send,
    C: Send + 'static,
{
    type Item = C;
    type Error = L::Error;

    async fn fold<T, St, Fut>(self, init: T, mut step: St) -> Result<Step<T>, Self::Error>
    where
        T: Send,
        St: FnMut(T, C) -> Fut + Send,
        Fut: Future<Output = Result<Step<T>, Self::Error>> + Send,
    {
        let left_queue = Queue::bounded(self.lc);
        let right_queue = Queue::bounded(self.rc);
        let _left_guard = spawn_source(self.left, left_queue.clone(), |take| take);
        let _right_guard = spawn_source(self.right, right_queue.clone(), |take| take);
        let mut left = Pull::new(left_queue);
        let mut right = Pull::new(right_queue);

        let mut f = self.f;
        let mut s = init;
        loop {
            match f(&mut left, &mut right).await? {
                None => return Ok(Step::Cont(s)),
                Some(c) => match step(s, c).await? {
                    Step::Cont(next) => s = next,
                    Step::Stop(next) => return Ok(Step::Stop(next)),
                },
            }
        }
    }
}

// ================================
// Extension Trait
// ================================

/// Concurrent combinators and the queue bridge.
pub trait ConcurrentStreamExt: Stream {
    /// Merge two same-typed streams. Per-source order is preserved; the
    /// interleaving between sources is non-deterministic. Uses a shared
    /// queue of capacity 1; use [`merge_with`](ConcurrentStreamExt::merge_with)
    /// to size the queue.
    fn merge<That>(self, that: That) -> Merge<Self, That, Self::Item>
    where
        Self: 'static,
        That: Stream<Item = Self::Item, Error = Self::Error> + 'static,
    {
        MergeWith {
            left: self,
            right: that,
            capacity: 1,
            fl: std::convert::identity,
            fr: std::convert::identity,
            _phantom: PhantomData,
        }
    }

    /// Merge two streams into a common element type. `capacity` bounds the
    /// shared queue and therefore the number of in-flight elements.
    fn merge_with<That, C, FL, FR>(
        self,
        that: That,
        capacity: usize,
        fl: FL,
        fr: FR,
    ) -> MergeWith<Self, That, FL, FR, C>
    where
        Self: 'static,
        That: Stream<Error = Self::Error> + 'static,
        FL: FnMut(Self::Item) -> C + Send,
        FR: FnMut(That::Item) -> C + Send,
        C: Send + 'static,
    {
        MergeWith {
            left: self,
            right: that,
            capacity,
            fl,
            fr,
            _phantom: PhantomData,
        }
    }

    /// Merge two streams, tagging every element with the source it came
    /// from.
    fn merge_either<That>(self, that: That) -> MergeEither<Self, That, Self::Item, That::Item>
    where
        Self: 'static,
        That: Stream<Error = Self::Error> + 'static,
    {
        MergeWith {
            left: self,
            right: that,
            capacity: 1,
            fl: Either::Left,
            fr: Either::Right,
            _phantom: PhantomData,
        }
    }

    /// Pair the two streams positionally, ending with the shorter side.
    fn zip<That>(self, that: That) -> Zip<Self, That, Self::Item, That::Item>
    where
        Self: 'static,
        That: Stream<Error = Self::Error> + 'static,
    {
        ZipWith {
            left: self,
            right: that,
            lc: 1,
            rc: 1,
            f: zip_pair,
            _phantom: PhantomData,
        }
    }

    /// Combine the two streams tick by tick: `f` receives one pulled
    /// element from each side and ends the stream by answering `None`.
    fn zip_with<That, C, F>(self, that: That, f: F) -> ZipWith<Self, That, F, C>
    where
        Self: 'static,
        That: Stream<Error = Self::Error> + 'static,
        F: FnMut(Option<Self::Item>, Option<That::Item>) -> Option<C> + Send,
        C: Send + 'static,
    {
        ZipWith {
            left: self,
            right: that,
            lc: 1,
            rc: 1,
            f,
            _phantom: PhantomData,
        }
    }

    /// The general join: the joiner drives both [`Pull`] handles itself and
    /// ends the stream by answering `None`. `lc` and `rc` bound per-side
    /// buffering and are deliberately required here.
    fn join_with<That, C, F>(
        self,
        that: That,
        lc: usize,
        rc: usize,
        f: F,
    ) -> JoinWith<Self, That, F, C>
    where
        Self: 'static,
        That: Stream<Error = Self::Error> + 'static,
        F: for<'a> FnMut(
                &'a mut Pull<Self::Error, Self::Item>,
                &'a mut Pull<Self::Error, That::Item>,
            ) -> BoxFuture<'a, Result<Option<C>, Self::Error>>
            + Send,
        C: Send + 'static,
    {
        JoinWith {
            left: self,
            right: that,
            lc,
            rc,
            f,
            _phantom: PhantomData,
        }
    }

    /// Copy this stream into a bounded queue of [`Take`](crate::take::Take)
    /// envelopes fed by a background task. The task is aborted when the
    /// returned [`StreamQueue`] is dropped.
    fn to_queue(self, capacity: usize) -> StreamQueue<Self::Error, Self::Item>
    where
        Self: 'static,
    {
        to_queue(self, capacity)
    }
}

impl<S> ConcurrentStreamExt for S where S: Stream {}
