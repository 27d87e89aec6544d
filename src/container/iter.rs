//! 带过滤条件的双向游标

use std::fmt;
use std::rc::Rc;

use super::OrderedContainer;

type Filter<'a, T> = Box<dyn Fn(&T) -> bool + 'a>;

/// 绑定到某个容器的游标
///
/// 游标取值范围为 `[-1, count]`，`-1` 表示首元素之前，`count` 表示末元素之后。
/// 迭代器只读取容器；迭代期间容器被共享借用，无法被修改。
pub struct FilteredIter<'a, T: ?Sized> {
    container: &'a OrderedContainer<T>,
    cursor: isize,
    filter: Option<Filter<'a, T>>,
}

impl<'a, T: ?Sized> FilteredIter<'a, T> {
    pub fn new(container: &'a OrderedContainer<T>) -> Self {
        Self {
            container,
            cursor: -1,
            filter: None,
        }
    }

    /// 安装或替换过滤条件
    pub fn set_filter<F>(&mut self, filter: F)
    where
        F: Fn(&T) -> bool + 'a,
    {
        self.filter = Some(Box::new(filter));
    }

    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&T) -> bool + 'a,
    {
        self.set_filter(filter);
        self
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
    }

    pub fn container(&self) -> &'a OrderedContainer<T> {
        self.container
    }

    pub fn position(&self) -> isize {
        self.cursor
    }

    /// 设置游标位置，超出 `[-1, count]` 的值会被截断到边界
    pub fn set_position(&mut self, cursor: isize) {
        self.cursor = cursor.clamp(-1, self.end());
    }

    pub fn reset(&mut self) {
        self.cursor = -1;
    }

    /// 向前移动到上一个满足条件的元素
    pub fn prev(&mut self) -> Option<&'a Rc<T>> {
        if self.cursor < 0 {
            return None;
        }

        loop {
            self.cursor -= 1;
            let item = self.current()?;
            if self.accepts(item) {
                return Some(item);
            }
        }
    }

    /// 统计满足条件的元素数量，不改变游标位置
    pub fn count_matching(&mut self) -> usize {
        if self.filter.is_none() {
            return self.container.count();
        }

        let saved = self.cursor;
        self.reset();
        let count = self.by_ref().count();
        self.cursor = saved;
        count
    }

    fn end(&self) -> isize {
        self.container.count() as isize
    }

    fn current(&self) -> Option<&'a Rc<T>> {
        let index = usize::try_from(self.cursor).ok()?;
        self.container.item_at(index)
    }

    fn accepts(&self, item: &T) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter(item))
    }
}

impl<'a, T: ?Sized> Iterator for FilteredIter<'a, T> {
    type Item = &'a Rc<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.end() {
            return None;
        }

        loop {
            self.cursor += 1;
            let item = self.current()?;
            if self.accepts(item) {
                return Some(item);
            }
        }
    }
}

impl<T: ?Sized> fmt::Debug for FilteredIter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteredIter")
            .field("cursor", &self.cursor)
            .field("count", &self.container.count())
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Item(u32);

    fn container(values: &[u32]) -> OrderedContainer<Item> {
        let mut container = OrderedContainer::new(2, 2).unwrap();
        for value in values {
            container.append(Rc::new(Item(*value))).unwrap();
        }
        container
    }

    fn forward(it: &mut FilteredIter<'_, Item>) -> Vec<u32> {
        it.reset();
        it.by_ref().map(|item| item.0).collect()
    }

    fn backward(it: &mut FilteredIter<'_, Item>) -> Vec<u32> {
        it.set_position(isize::MAX);
        let mut values = Vec::new();
        while let Some(item) = it.prev() {
            values.push(item.0);
        }
        values
    }

    #[test]
    fn test_unfiltered_follows_insertion_order() {
        let container = container(&[5, 3, 9, 1]);
        let mut it = container.filtered();
        assert_eq!(it.position(), -1);
        assert_eq!(forward(&mut it), [5, 3, 9, 1]);
        assert_eq!(it.position(), 4);
        assert!(it.next().is_none());
        assert_eq!(it.position(), 4);
    }

    #[test]
    fn test_forward_and_backward_mirror() {
        let container = container(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let filters: [fn(&Item) -> bool; 5] = [
            |_| true,
            |_| false,
            |item| item.0 % 2 == 0,
            |item| item.0 > 7,
            |item| item.0 == 1 || item.0 == 10,
        ];

        for filter in filters {
            let mut it = container.filtered().with_filter(filter);
            let mut fwd = forward(&mut it);
            let bwd = backward(&mut it);
            fwd.reverse();
            assert_eq!(fwd, bwd);
        }

        let empty = container_empty();
        let mut it = empty.filtered();
        assert!(forward(&mut it).is_empty());
        assert!(backward(&mut it).is_empty());
    }

    fn container_empty() -> OrderedContainer<Item> {
        OrderedContainer::new(0, 1).unwrap()
    }

    #[test]
    fn test_prev_stops_at_start() {
        let container = container(&[1, 2]);
        let mut it = container.filtered();
        assert!(it.prev().is_none());
        assert_eq!(it.next().map(|i| i.0), Some(1));
        assert!(it.prev().is_none());
        assert_eq!(it.position(), -1);
    }

    #[test]
    fn test_count_matching_keeps_cursor() {
        let container = container(&[1, 2, 3, 4, 5, 6]);
        let mut it = container.filtered().with_filter(|item| item.0 % 3 == 0);

        assert_eq!(it.next().map(|i| i.0), Some(3));
        let before = it.position();
        assert_eq!(it.count_matching(), 2);
        assert_eq!(it.position(), before);
        assert_eq!(it.next().map(|i| i.0), Some(6));

        assert_eq!(it.count_matching(), forward(&mut it).len());

        it.clear_filter();
        it.set_position(2);
        assert_eq!(it.count_matching(), 6);
        assert_eq!(it.position(), 2);
    }

    #[test]
    fn test_set_filter_replaces_previous() {
        let container = container(&[1, 2, 3, 4]);
        let mut it = container.filtered();
        it.set_filter(|item: &Item| item.0 < 3);
        assert_eq!(forward(&mut it), [1, 2]);
        it.set_filter(|item: &Item| item.0 >= 3);
        assert_eq!(forward(&mut it), [3, 4]);
    }
}
