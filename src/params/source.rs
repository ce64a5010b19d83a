use crate::server::HttpRequest;

/// Where field values come from while binding a parameter struct.
pub trait ValueSource {
    /// Every value carried for `name`, in request order.
    fn values(&self, name: &str) -> Vec<&str>;

    /// Every name/value pair, in request order.
    fn pairs(&self) -> Vec<(&str, &str)>;
}

/// Query-string values only.
pub struct QuerySource<'a> {
    req: &'a HttpRequest,
}

impl<'a> QuerySource<'a> {
    #[must_use]
    pub fn new(req: &'a HttpRequest) -> Self {
        Self { req }
    }
}

impl ValueSource for QuerySource<'_> {
    fn values(&self, name: &str) -> Vec<&str> {
        self.req.query_values(name).collect()
    }

    fn pairs(&self) -> Vec<(&str, &str)> {
        self.req.query_pairs().collect()
    }
}

/// Form-body values, falling back to the query string per name.
pub struct FormSource<'a> {
    req: &'a HttpRequest,
}

impl<'a> FormSource<'a> {
    #[must_use]
    pub fn new(req: &'a HttpRequest) -> Self {
        Self { req }
    }
}

impl ValueSource for FormSource<'_> {
    fn values(&self, name: &str) -> Vec<&str> {
        let form: Vec<&str> = self.req.form_values(name).collect();
        if form.is_empty() {
            self.req.query_values(name).collect()
        } else {
            form
        }
    }

    fn pairs(&self) -> Vec<(&str, &str)> {
        self.req.form_pairs().chain(self.req.query_pairs()).collect()
    }
}
