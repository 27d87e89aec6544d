//! 有序容器
//!
//! 控件集合的底层存储：按插入顺序保存共享句柄，容量按固定步长线性增长。
//! 元素身份即句柄身份 (`Rc::ptr_eq`)，查找与删除均为 O(n) 线性扫描，
//! 适用于终端界面中的小型列表。

mod iter;

use std::fmt;
use std::rc::Rc;

use crate::error::{KernelError, Result};

pub use iter::FilteredIter;

/// 线性增长的有序句柄序列
pub struct OrderedContainer<T: ?Sized> {
    items: Vec<Rc<T>>,
    limit: usize,
    step: usize,
}

impl<T: ?Sized> OrderedContainer<T> {
    /// 以初始容量和增长步长创建容器
    pub fn new(limit: usize, step: usize) -> Result<Self> {
        if step == 0 {
            return Err(KernelError::InvalidGrowthStep);
        }

        let mut items = Vec::new();
        items.try_reserve_exact(limit)?;

        Ok(Self { items, limit, step })
    }

    /// 清空元素，保留已分配的容量
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// 追加元素并返回新的元素数量
    ///
    /// 传入 `None` 不做任何事，直接返回当前数量。容器已满时先将容量
    /// 增加恰好一个步长；分配失败时容器保持不变。
    pub fn append(&mut self, item: impl Into<Option<Rc<T>>>) -> Result<usize> {
        let Some(item) = item.into() else {
            return Ok(self.items.len());
        };

        if self.items.len() == self.limit {
            self.items.try_reserve_exact(self.step)?;
            self.limit += self.step;
        }

        self.items.push(item);
        Ok(self.items.len())
    }

    /// 删除元素，其后的元素依次前移，返回被删除元素原来的位置
    pub fn remove(&mut self, item: &Rc<T>) -> Result<usize> {
        let index = self.index_of(item).ok_or(KernelError::NotFound)?;
        self.items.remove(index);
        Ok(index)
    }

    pub fn item_at(&self, index: usize) -> Option<&Rc<T>> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&Rc<T>> {
        self.item_at(0)
    }

    /// 按句柄身份查找元素位置 (O(n))
    pub fn index_of(&self, item: &Rc<T>) -> Option<usize> {
        self.items.iter().position(|it| Rc::ptr_eq(it, item))
    }

    pub fn contains(&self, item: &Rc<T>) -> bool {
        self.index_of(item).is_some()
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 当前容量上限（逻辑容量，只随追加线性增长）
    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn growth_step(&self) -> usize {
        self.step
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rc<T>> {
        self.items.iter()
    }

    /// 创建绑定到本容器的过滤迭代器
    pub fn filtered(&self) -> FilteredIter<'_, T> {
        FilteredIter::new(self)
    }
}

impl<T: ?Sized> fmt::Debug for OrderedContainer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedContainer")
            .field("count", &self.items.len())
            .field("limit", &self.limit)
            .field("step", &self.step)
            .finish()
    }
}

impl<'a, T: ?Sized> IntoIterator for &'a OrderedContainer<T> {
    type Item = &'a Rc<T>;
    type IntoIter = std::slice::Iter<'a, Rc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
