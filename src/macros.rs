/// Builds a [`Document`](crate::Document) from tags, keys and values.
///
/// Tags and keys keep the order they are written in; values can be any
/// expression implementing `ToString`. Nothing is registered, so the
/// result prints but does not restrict what a later parse accepts.
///
/// ```rust
/// use ztk::ztk;
///
/// let doc = ztk! {
///     "tag1" => {
///         "key1" => [10],
///         "key2" => [20, 30],
///     },
///     "tag2" => {},
/// };
/// assert_eq!(doc.to_string(), "[tag1]\nkey1: 10\nkey2: 20, 30\n\n[tag2]\n");
/// ```
#[macro_export]
macro_rules! ztk {
    () => {
        $crate::Document::new()
    };

    ($($tag:expr => { $($key:expr => [ $($value:expr),* $(,)? ]),* $(,)? }),+ $(,)?) => {{
        let mut document = $crate::Document::new();
        $(
            #[allow(unused_variables)]
            let tag = document.add_tag($tag);
            $(
                #[allow(unused_variables)]
                let key = tag.add_key($key);
                $(
                    key.push($value.to_string());
                )*
            )*
        )+
        document.rewind_tags();
        document
    }};
}
