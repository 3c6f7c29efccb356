named_handlers!(tags, tags, "tag", "tags");
