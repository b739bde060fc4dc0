/// Storage for values keyed by small integers, reusing the keys of removed values.
/// Used to map poll tokens to connections.
pub struct Slab<T> {
    entries: Vec<Option<T>>,
    vacant: Vec<usize>,
    len: usize,
}

impl<T> Slab<T> {
    /// Creates a new slab with room for the given number of values.
    pub fn with_capacity(capacity: usize) -> Slab<T> {
        Slab { entries: Vec::with_capacity(capacity), vacant: vec![], len: 0 }
    }

    /// Gets the key the next inserted value will get.
    pub fn next_key(&self) -> usize {
        self.vacant.last().copied().unwrap_or(self.entries.len())
    }

    /// Stores the value under next_key and returns that key.
    pub fn insert(&mut self, value: T) -> usize {
        self.len += 1;
        match self.vacant.pop() {
            Some(key) => {
                self.entries[key] = Some(value);
                key
            }
            None => {
                self.entries.push(Some(value));
                self.entries.len() - 1
            }
        }
    }

    pub fn get(&self, key: usize) -> Option<&T> {
        self.entries.get(key)?.as_ref()
    }

    /// Removes and returns the value with the given key, if any.
    pub fn remove(&mut self, key: usize) -> Option<T> {
        let value = self.entries.get_mut(key)?.take()?;
        self.vacant.push(key);
        self.len -= 1;
        Some(value)
    }

    /// Removes every value the predicate rejects.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        for key in 0..self.entries.len() {
            if matches!(&self.entries[key], Some(value) if !keep(value)) {
                self.remove(key);
            }
        }
    }

    /// The number of values stored.
    pub fn len(&self) -> usize {
        self.len
    }
}
