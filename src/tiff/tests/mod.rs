#[cfg(test)]
mod reader_tests;
#[cfg(test)]
mod geo_tests;
